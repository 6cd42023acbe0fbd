//! 构建元数据的环境变量覆盖
//!
//! 在解析器边界一次性读取，解析逻辑本身不再接触进程环境。

/// 每个字段依次检查的变量名：先主名称，再兼容旧部署流水线的名称
pub const COMMIT_SHA_KEYS: &[&str] = &["RECEIPT_COMMIT_SHA", "NEXT_PUBLIC_COMMIT_SHA"];
pub const REPO_SLUG_KEYS: &[&str] = &["RECEIPT_REPO_SLUG", "NEXT_PUBLIC_REPO_SLUG"];
pub const REPO_URL_KEYS: &[&str] = &["RECEIPT_REPO_URL", "NEXT_PUBLIC_REPO_URL"];
pub const BUILD_ID_KEYS: &[&str] = &["RECEIPT_BUILD_ID", "NEXT_PUBLIC_BUILD_ID"];
pub const BUILD_TIMESTAMP_KEYS: &[&str] =
    &["RECEIPT_BUILD_TIMESTAMP", "NEXT_PUBLIC_BUILD_TIMESTAMP"];
pub const BUILD_HASH_KEYS: &[&str] = &["RECEIPT_BUILD_HASH", "NEXT_PUBLIC_BUILD_HASH"];

/// 环境变量覆盖快照，空值视为未设置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    pub commit_sha: Option<String>,
    pub repo_slug: Option<String>,
    pub repo_url: Option<String>,
    pub build_id: Option<String>,
    pub build_timestamp: Option<String>,
    pub build_hash: Option<String>,
}

impl BuildEnv {
    /// 从当前进程环境读取
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意查找函数读取（测试中使用 HashMap 等）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        Self {
            commit_sha: first(COMMIT_SHA_KEYS),
            repo_slug: first(REPO_SLUG_KEYS),
            repo_url: first(REPO_URL_KEYS),
            build_id: first(BUILD_ID_KEYS),
            build_timestamp: first(BUILD_TIMESTAMP_KEYS),
            build_hash: first(BUILD_HASH_KEYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> BuildEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BuildEnv::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_empty_environment() {
        assert_eq!(env_of(&[]), BuildEnv::default());
    }

    #[test]
    fn test_primary_key_wins_over_legacy() {
        let env = env_of(&[
            ("RECEIPT_COMMIT_SHA", "aaa"),
            ("NEXT_PUBLIC_COMMIT_SHA", "bbb"),
        ]);
        assert_eq!(env.commit_sha.as_deref(), Some("aaa"));
    }

    #[test]
    fn test_legacy_key_is_honoured() {
        let env = env_of(&[
            ("NEXT_PUBLIC_REPO_SLUG", "owner/repo"),
            ("NEXT_PUBLIC_BUILD_ID", "run-17"),
            ("NEXT_PUBLIC_BUILD_HASH", "sha256:ff"),
        ]);
        assert_eq!(env.repo_slug.as_deref(), Some("owner/repo"));
        assert_eq!(env.build_id.as_deref(), Some("run-17"));
        assert_eq!(env.build_hash.as_deref(), Some("sha256:ff"));
        assert_eq!(env.repo_url, None);
    }

    #[test]
    fn test_blank_values_fall_through() {
        let env = env_of(&[
            ("RECEIPT_REPO_URL", "   "),
            ("NEXT_PUBLIC_REPO_URL", "https://example.com/a/b"),
            ("RECEIPT_BUILD_TIMESTAMP", ""),
        ]);
        assert_eq!(env.repo_url.as_deref(), Some("https://example.com/a/b"));
        assert_eq!(env.build_timestamp, None);
    }
}
