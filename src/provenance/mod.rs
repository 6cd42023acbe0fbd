//! 构建来源解析模块
//!
//! 负责收集当前部署的构建信息（提交、仓库、构建时间），来源优先级：
//! 1. 环境变量覆盖 ([`BuildEnv`])
//! 2. 本地版本控制查询 ([`CommandRunner`])
//! 3. 哨兵值 [`UNKNOWN`]
//!
//! 解析永不失败：任何外部调用的失败只会让对应字段降级为 `UNKNOWN` 或 `None`。

pub mod env;
pub mod remote;
pub mod runner;
pub mod timestamp;

pub use env::BuildEnv;
pub use remote::{parse_remote_url, RemoteInfo};
pub use runner::{CommandError, CommandRunner, GitCommandRunner};

use crate::util::config::ProvenanceConfig;
use crate::util::logging::standards::events;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 无法解析字段时使用的哨兵值
pub const UNKNOWN: &str = "UNKNOWN";
pub const PROOF_GATE: &str = "PASSED";
pub const DEPLOYMENT_STATUS: &str = "LIVE";
pub const DEPLOYED_VIA: &str = "APP FACTORY — REPO MODE";

const SHORT_SHA_LEN: usize = 7;

/// 一次解析得到的构建信息，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMeta {
    pub repo_slug: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub commit_sha_short: String,
    pub commit_url: String,
    pub build_id: Option<String>,
    pub build_timestamp: String,
    pub build_hash: Option<String>,
    pub proof_gate: &'static str,
    pub deployment_status: &'static str,
    pub deployed_via: &'static str,
}

/// 提交短哈希：取前 7 个字符，未知时保持 UNKNOWN
pub fn short_sha(commit_sha: &str) -> String {
    if commit_sha == UNKNOWN {
        UNKNOWN.to_string()
    } else {
        commit_sha.chars().take(SHORT_SHA_LEN).collect()
    }
}

/// 提交链接：仓库或提交任一未知时整体为 UNKNOWN
pub fn commit_url(web_host: &str, repo_slug: &str, commit_sha: &str) -> String {
    if repo_slug == UNKNOWN || commit_sha == UNKNOWN {
        UNKNOWN.to_string()
    } else {
        format!("{}/{}/commit/{}", web_host, repo_slug, commit_sha)
    }
}

/// 构建信息解析器
#[derive(Clone)]
pub struct BuildMetaResolver {
    runner: Arc<dyn CommandRunner>,
    remote_name: String,
    web_host: String,
}

impl BuildMetaResolver {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            remote_name: "origin".to_string(),
            web_host: "https://github.com".to_string(),
        }
    }

    /// 按配置创建使用本地 git 的解析器
    pub fn from_config(config: &ProvenanceConfig) -> Self {
        let mut runner = GitCommandRunner::new(
            config.git_program.clone(),
            Duration::from_millis(config.command_timeout_ms),
        );
        if let Some(dir) = config.repo_dir.as_ref().filter(|d| !d.trim().is_empty()) {
            runner = runner.with_working_dir(dir);
        }

        info!(
            event = events::RESOLVER_INIT,
            git_program = %config.git_program,
            repo_dir = ?config.repo_dir,
            remote = %config.remote_name,
            web_host = %config.web_host,
            timeout_ms = config.command_timeout_ms
        );

        Self::new(Arc::new(runner))
            .with_remote_name(config.remote_name.clone())
            .with_web_host(config.web_host.clone())
    }

    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = remote_name.into();
        self
    }

    pub fn with_web_host(mut self, web_host: impl Into<String>) -> Self {
        self.web_host = web_host.into().trim_end_matches('/').to_string();
        self
    }

    /// 读取进程环境与当前时间并解析
    pub fn resolve(&self) -> BuildMeta {
        self.resolve_with(&BuildEnv::from_process(), Utc::now())
    }

    /// 纯解析逻辑：环境与时间均由调用方注入
    pub fn resolve_with(&self, env: &BuildEnv, now: DateTime<Utc>) -> BuildMeta {
        let commit_sha = match &env.commit_sha {
            Some(sha) => sha.clone(),
            None => self.commit_sha_from_vcs(),
        };

        let mut repo_url = env.repo_url.clone();
        let repo_slug = match &env.repo_slug {
            Some(slug) => slug.clone(),
            None => match self.remote_from_vcs() {
                Some(remote) => {
                    if repo_url.is_none() {
                        repo_url = Some(remote.url);
                    }
                    remote.slug
                }
                None => UNKNOWN.to_string(),
            },
        };

        let repo_url = repo_url.unwrap_or_else(|| {
            if repo_slug == UNKNOWN {
                UNKNOWN.to_string()
            } else {
                format!("{}/{}", self.web_host, repo_slug)
            }
        });

        let meta = BuildMeta {
            commit_sha_short: short_sha(&commit_sha),
            commit_url: commit_url(&self.web_host, &repo_slug, &commit_sha),
            repo_slug,
            repo_url,
            commit_sha,
            build_id: env.build_id.clone(),
            build_timestamp: env
                .build_timestamp
                .clone()
                .unwrap_or_else(|| timestamp::to_iso8601(now)),
            build_hash: env.build_hash.clone(),
            proof_gate: PROOF_GATE,
            deployment_status: DEPLOYMENT_STATUS,
            deployed_via: DEPLOYED_VIA,
        };

        debug!(
            event = events::RESOLVE_COMPLETE,
            repo_slug = %meta.repo_slug,
            commit = %meta.commit_sha_short,
            build_id = ?meta.build_id
        );
        meta
    }

    fn commit_sha_from_vcs(&self) -> String {
        match self.runner.run(&["rev-parse", "HEAD"]) {
            Ok(sha) => sha,
            Err(err) => {
                warn!(
                    event = events::VCS_QUERY_FAILED,
                    query = "rev-parse HEAD",
                    error = %err
                );
                UNKNOWN.to_string()
            }
        }
    }

    fn remote_from_vcs(&self) -> Option<RemoteInfo> {
        let remote = match self
            .runner
            .run(&["remote", "get-url", self.remote_name.as_str()])
        {
            Ok(remote) => remote,
            Err(err) => {
                warn!(
                    event = events::VCS_QUERY_FAILED,
                    query = "remote get-url",
                    remote = %self.remote_name,
                    error = %err
                );
                return None;
            }
        };

        let parsed = parse_remote_url(&remote);
        if parsed.is_none() {
            // 远程地址可能含凭据，不记录原文
            warn!(
                event = events::REMOTE_UNRECOGNIZED,
                remote = %self.remote_name
            );
        }
        parsed
    }
}

impl std::fmt::Debug for BuildMetaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildMetaResolver")
            .field("remote_name", &self.remote_name)
            .field("web_host", &self.web_host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    const FULL_SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    /// 按参数返回预设结果，并记录调用
    #[derive(Default)]
    struct FakeRunner {
        head: Option<String>,
        remote: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn with(head: Option<&str>, remote: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                head: head.map(str::to_string),
                remote: remote.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, args: &[&str]) -> Result<String, CommandError> {
            let joined = args.join(" ");
            self.calls.lock().unwrap().push(joined.clone());
            let answer = match args.first().copied() {
                Some("rev-parse") => self.head.clone(),
                Some("remote") => self.remote.clone(),
                _ => None,
            };
            answer.ok_or(CommandError::Exit {
                code: Some(128),
                stderr: "fatal: not a git repository".to_string(),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn resolver(runner: Arc<FakeRunner>) -> BuildMetaResolver {
        BuildMetaResolver::new(runner)
    }

    #[test]
    fn test_everything_unknown_without_vcs_or_env() {
        let meta = resolver(FakeRunner::with(None, None)).resolve_with(&BuildEnv::default(), now());

        assert_eq!(meta.commit_sha, UNKNOWN);
        assert_eq!(meta.commit_sha_short, UNKNOWN);
        assert_eq!(meta.commit_url, UNKNOWN);
        assert_eq!(meta.repo_slug, UNKNOWN);
        assert_eq!(meta.repo_url, UNKNOWN);
        assert_eq!(meta.build_id, None);
        assert_eq!(meta.build_hash, None);
        assert_eq!(meta.build_timestamp, "2024-05-01T12:00:00.000Z");
        assert_eq!(meta.proof_gate, "PASSED");
        assert_eq!(meta.deployment_status, "LIVE");
        assert_eq!(meta.deployed_via, DEPLOYED_VIA);
    }

    #[test]
    fn test_values_come_from_vcs() {
        let runner = FakeRunner::with(Some(FULL_SHA), Some("git@github.com:owner/repo.git"));
        let meta = resolver(runner.clone()).resolve_with(&BuildEnv::default(), now());

        assert_eq!(meta.commit_sha, FULL_SHA);
        assert_eq!(meta.commit_sha_short, "0123456");
        assert_eq!(meta.repo_slug, "owner/repo");
        assert_eq!(meta.repo_url, "https://github.com/owner/repo");
        assert_eq!(
            meta.commit_url,
            format!("https://github.com/owner/repo/commit/{FULL_SHA}")
        );
        assert_eq!(
            runner.calls(),
            vec!["rev-parse HEAD".to_string(), "remote get-url origin".to_string()]
        );
    }

    #[test]
    fn test_overrides_skip_vcs_entirely() {
        let runner = FakeRunner::with(Some("ffffffff"), Some("git@gitlab.com:other/thing.git"));
        let env = BuildEnv {
            commit_sha: Some(FULL_SHA.to_string()),
            repo_slug: Some("acme/site".to_string()),
            ..BuildEnv::default()
        };
        let meta = resolver(runner.clone()).resolve_with(&env, now());

        assert_eq!(
            meta.commit_url,
            format!("https://github.com/acme/site/commit/{FULL_SHA}")
        );
        assert_eq!(meta.repo_url, "https://github.com/acme/site");
        assert_eq!(meta.commit_sha_short, "0123456");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_unknown_commit_hides_commit_url_even_with_slug() {
        let env = BuildEnv {
            repo_slug: Some("acme/site".to_string()),
            ..BuildEnv::default()
        };
        let meta = resolver(FakeRunner::with(None, None)).resolve_with(&env, now());

        assert_eq!(meta.repo_slug, "acme/site");
        assert_eq!(meta.commit_sha, UNKNOWN);
        assert_eq!(meta.commit_sha_short, UNKNOWN);
        assert_eq!(meta.commit_url, UNKNOWN);
    }

    #[test]
    fn test_unknown_slug_hides_commit_url() {
        let meta = resolver(FakeRunner::with(Some(FULL_SHA), Some("/srv/git/repo.git")))
            .resolve_with(&BuildEnv::default(), now());

        assert_eq!(meta.commit_sha, FULL_SHA);
        assert_eq!(meta.repo_slug, UNKNOWN);
        assert_eq!(meta.repo_url, UNKNOWN);
        assert_eq!(meta.commit_url, UNKNOWN);
    }

    #[test]
    fn test_url_override_beats_remote_url() {
        let env = BuildEnv {
            repo_url: Some("https://code.example.com/mirror".to_string()),
            ..BuildEnv::default()
        };
        let meta = resolver(FakeRunner::with(
            Some(FULL_SHA),
            Some("https://gitlab.com/group/proj.git"),
        ))
        .resolve_with(&env, now());

        assert_eq!(meta.repo_slug, "group/proj");
        assert_eq!(meta.repo_url, "https://code.example.com/mirror");
    }

    #[test]
    fn test_url_override_survives_unknown_slug() {
        let env = BuildEnv {
            repo_url: Some("https://code.example.com/mirror".to_string()),
            ..BuildEnv::default()
        };
        let meta = resolver(FakeRunner::with(None, None)).resolve_with(&env, now());

        assert_eq!(meta.repo_slug, UNKNOWN);
        assert_eq!(meta.repo_url, "https://code.example.com/mirror");
        assert_eq!(meta.commit_url, UNKNOWN);
    }

    #[test]
    fn test_remote_url_keeps_remote_host_but_commit_url_uses_web_host() {
        let meta = resolver(FakeRunner::with(
            Some(FULL_SHA),
            Some("https://gitlab.com/group/proj.git"),
        ))
        .resolve_with(&BuildEnv::default(), now());

        assert_eq!(meta.repo_url, "https://gitlab.com/group/proj");
        assert_eq!(
            meta.commit_url,
            format!("https://github.com/group/proj/commit/{FULL_SHA}")
        );
    }

    #[test]
    fn test_custom_remote_and_web_host() {
        let runner = FakeRunner::with(Some(FULL_SHA), Some("git@git.example.com:team/app.git"));
        let meta = BuildMetaResolver::new(runner.clone())
            .with_remote_name("upstream")
            .with_web_host("https://git.example.com/")
            .resolve_with(&BuildEnv::default(), now());

        assert_eq!(
            meta.commit_url,
            format!("https://git.example.com/team/app/commit/{FULL_SHA}")
        );
        assert!(runner.calls().contains(&"remote get-url upstream".to_string()));
    }

    #[test]
    fn test_optional_fields_and_timestamp_override() {
        let env = BuildEnv {
            build_id: Some("run-42".to_string()),
            build_hash: Some("sha256:abcd".to_string()),
            build_timestamp: Some("yesterday-ish".to_string()),
            ..BuildEnv::default()
        };
        let meta = resolver(FakeRunner::with(None, None)).resolve_with(&env, now());

        assert_eq!(meta.build_id.as_deref(), Some("run-42"));
        assert_eq!(meta.build_hash.as_deref(), Some("sha256:abcd"));
        assert_eq!(meta.build_timestamp, "yesterday-ish");
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha(FULL_SHA), "0123456");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha(UNKNOWN), UNKNOWN);
    }

    #[test]
    fn test_json_shape() {
        let meta = resolver(FakeRunner::with(Some(FULL_SHA), Some("git@github.com:owner/repo.git")))
            .resolve_with(&BuildEnv::default(), now());
        let value = serde_json::to_value(&meta).unwrap();

        assert_eq!(value["repoSlug"], "owner/repo");
        assert_eq!(value["commitShaShort"], "0123456");
        assert_eq!(value["buildId"], serde_json::Value::Null);
        assert_eq!(value["proofGate"], "PASSED");
        assert_eq!(value["deploymentStatus"], "LIVE");
    }

    #[test]
    fn test_resolve_reads_legacy_key_from_process_env() {
        std::env::set_var("NEXT_PUBLIC_BUILD_HASH", "sha256-from-pipeline");
        let meta = resolver(FakeRunner::with(Some(FULL_SHA), None)).resolve();
        std::env::remove_var("NEXT_PUBLIC_BUILD_HASH");

        assert_eq!(meta.build_hash.as_deref(), Some("sha256-from-pipeline"));
        assert!(!meta.build_timestamp.is_empty());
    }
}
