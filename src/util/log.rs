use crate::util::config::{LevelConfig, LoggingConfig};
use crate::util::logging::standards::events;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 按配置初始化日志：控制台 + 可选的按天滚动文件
///
/// 返回的 guard 必须在进程存活期间持有，否则文件日志会丢失尾部内容。
pub fn log_init_with_config(
    file_prefix: &str,
    config: &LoggingConfig,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level_filter = parse_level(&config.level).unwrap_or(LevelFilter::INFO);
    let filter_expression = build_env_filter_expression(level_filter, config.level_config.as_ref());
    let use_json = config.structured.unwrap_or(false);

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(use_json, make_filter(&filter_expression, level_filter))];

    let mut guard = None;
    let mut log_dir = None;
    if config.file.enabled {
        let dir = resolve_log_dir(&config.file.directory);
        std::fs::create_dir_all(&dir)?;

        let file_appender = daily(&dir, format!("{}.log", file_prefix));
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        let filter = make_filter(&filter_expression, level_filter);
        let file_layer = if use_json {
            layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(filter)
                .boxed()
        } else {
            layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(non_blocking)
                .with_filter(filter)
                .boxed()
        };
        layers.push(file_layer);
        guard = Some(file_guard);
        log_dir = Some(dir);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))?;

    tracing::info!(
        event = events::LOG_INIT,
        level = %config.level,
        filter = %filter_expression,
        structured = use_json,
        file = config.file.enabled,
        directory = ?log_dir.as_ref().map(|d| d.display().to_string())
    );

    if let (Some(dir), Some(retention)) = (log_dir.as_ref(), config.file.retention_days) {
        match cleanup_old_logs(dir, file_prefix, retention) {
            Ok(deleted) => tracing::info!(event = events::LOG_RETENTION, days = retention, deleted),
            Err(e) => tracing::warn!("日志清理失败: {}", e),
        }
    }

    Ok(guard)
}

fn stdout_layer(use_json: bool, filter: EnvFilter) -> BoxedLayer {
    if use_json {
        layer()
            .json()
            .with_target(false)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed()
    } else {
        let console_format = Format::default()
            .without_time()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false);

        layer()
            .event_format(console_format)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed()
    }
}

fn make_filter(expression: &str, fallback: LevelFilter) -> EnvFilter {
    EnvFilter::try_new(expression).unwrap_or_else(|_| EnvFilter::new(level_filter_to_str(fallback)))
}

/// 相对目录基于工作目录；位于 bin/ 下运行时基于上级目录
fn resolve_log_dir(directory: &str) -> PathBuf {
    let path = Path::new(directory);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if current_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
        if let Some(parent) = current_dir.parent() {
            return parent.join(path);
        }
    }
    current_dir.join(path)
}

/// 删除超过保留天数的日志文件，返回删除数量
pub fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, retention_days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let max_age = std::time::Duration::from_secs(retention_days as u64 * 24 * 60 * 60);
    let now = std::time::SystemTime::now();
    let mut deleted = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        // 只处理本服务的日志文件
        let is_ours = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(file_prefix))
            .unwrap_or(false);
        if !is_ours {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified().unwrap_or(now);
        let expired = now
            .duration_since(modified)
            .map(|age| age > max_age)
            .unwrap_or(false);
        if expired {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    deleted += 1;
                    tracing::debug!("已删除过期日志: {}", path.display());
                }
                Err(e) => tracing::warn!("删除日志文件失败: {} - {}", path.display(), e),
            }
        }
    }

    Ok(deleted)
}

fn build_env_filter_expression(default_level: LevelFilter, level_config: Option<&LevelConfig>) -> String {
    let mut directives = vec![level_filter_to_str(default_level).to_string()];

    if let Some(cfg) = level_config {
        if let Some(level) = cfg.provenance.as_deref().and_then(normalize_level_str) {
            directives.push(format!("build_receipt::provenance={level}"));
        }
        if let Some(level) = cfg.http.as_deref().and_then(normalize_level_str) {
            directives.push(format!("build_receipt::api={level}"));
            directives.push(format!("server.http={level}"));
        }

        let mut overrides: Vec<_> = cfg.overrides.iter().collect();
        overrides.sort();
        for (target, level_str) in overrides {
            if let Some(level) = normalize_level_str(level_str) {
                directives.push(format!("{}={level}", normalize_directive_target(target)));
            }
        }
    }

    directives.join(",")
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match normalize_level_str(level)? {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        _ => Some(LevelFilter::ERROR),
    }
}

fn normalize_level_str(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn level_filter_to_str(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::OFF => "off",
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
    }
}

fn normalize_directive_target(target: &str) -> String {
    if let Some(raw) = target.strip_prefix("target:") {
        raw.to_string()
    } else if target.contains("::") {
        target.to_string()
    } else {
        let path = target.replace('.', "::");
        format!("build_receipt::{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_filter_expression_without_level_config() {
        assert_eq!(build_env_filter_expression(LevelFilter::WARN, None), "warn");
    }

    #[test]
    fn test_filter_expression_with_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("page".to_string(), "debug".to_string());
        overrides.insert("target:tower_http".to_string(), "WARN".to_string());
        overrides.insert("util.config".to_string(), "loud".to_string());
        let cfg = LevelConfig {
            provenance: Some("trace".to_string()),
            http: None,
            overrides,
        };

        let expr = build_env_filter_expression(LevelFilter::INFO, Some(&cfg));
        assert_eq!(
            expr,
            "info,build_receipt::provenance=trace,build_receipt::page=debug,tower_http=warn"
        );
        assert!(EnvFilter::try_new(&expr).is_ok());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level(" error "), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_cleanup_only_touches_prefixed_files() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("build-receipt.log.2020-01-01");
        let other = dir.path().join("unrelated.txt");
        std::fs::write(&ours, "old").unwrap();
        std::fs::write(&other, "keep").unwrap();

        // 保留 0 天：任何修改时间早于当前的文件都会过期
        std::thread::sleep(std::time::Duration::from_millis(20));
        let deleted = cleanup_old_logs(dir.path(), "build-receipt", 0).unwrap();

        assert_eq!(deleted, 1);
        assert!(!ours.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let deleted = cleanup_old_logs(Path::new("/definitely/not/here/7f3a"), "x", 7).unwrap();
        assert_eq!(deleted, 0);
    }
}
