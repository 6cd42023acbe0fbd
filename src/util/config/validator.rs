//! 配置验证模块
//! 提供配置的验证、检查和诊断功能

use super::types::*;
use url::Url;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const SLOW_COMMAND_TIMEOUT_MS: u64 = 30_000;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 全面验证配置
    pub fn validate_all(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_server_config(&config.server, &mut report);
        Self::validate_provenance_config(&config.provenance, &mut report);
        Self::validate_page_config(&config.page, &mut report);
        Self::validate_logging_config(&config.logging, &mut report);

        report
    }

    fn validate_server_config(server: &ServerConfig, report: &mut ValidationReport) {
        if server.port == 0 {
            report.add_error("server.port", "端口不能为0");
        } else if server.port < 1024 {
            report.add_warning("server.port", "使用了特权端口，可能需要管理员权限");
        }

        if server.host.trim().is_empty() {
            report.add_error("server.host", "监听地址不能为空");
        }

        if server.request_timeout_secs == 0 {
            report.add_error("server.request_timeout_secs", "请求超时必须大于0");
        }
    }

    fn validate_provenance_config(cfg: &ProvenanceConfig, report: &mut ValidationReport) {
        if cfg.git_program.trim().is_empty() {
            report.add_error("provenance.git_program", "git程序不能为空");
        }

        if cfg.remote_name.trim().is_empty() {
            report.add_error("provenance.remote_name", "远程名称不能为空");
        }

        if let Err(message) = check_http_url(&cfg.web_host) {
            report.add_error("provenance.web_host", &message);
        }

        if cfg.command_timeout_ms == 0 {
            report.add_error("provenance.command_timeout_ms", "命令超时必须大于0");
        } else if cfg.command_timeout_ms > SLOW_COMMAND_TIMEOUT_MS {
            report.add_warning(
                "provenance.command_timeout_ms",
                "命令超时超过30秒，git无响应时页面渲染会长时间阻塞",
            );
        }

        match cfg.repo_dir.as_deref() {
            Some(dir) if !std::path::Path::new(dir).is_dir() => {
                report.add_warning("provenance.repo_dir", &format!("仓库目录不存在: {}", dir));
            }
            Some(_) => {}
            None => report.add_info("provenance.repo_dir", "在当前工作目录执行git"),
        }
    }

    fn validate_page_config(page: &PageConfig, report: &mut ValidationReport) {
        if let Err(message) = check_http_url(&page.factory_url) {
            report.add_error("page.factory_url", &message);
        }

        if page.title.trim().is_empty() {
            report.add_warning("page.title", "页面标题为空");
        }

        if page.output_path.trim().is_empty() {
            report.add_error("page.output_path", "输出路径不能为空");
        }
    }

    fn validate_logging_config(logging: &LoggingConfig, report: &mut ValidationReport) {
        if !VALID_LEVELS.contains(&logging.level.trim().to_ascii_lowercase().as_str()) {
            report.add_error(
                "logging.level",
                &format!("无效的日志级别: {}", logging.level),
            );
        }

        if logging.file.enabled && logging.file.directory.trim().is_empty() {
            report.add_error("logging.file.directory", "启用文件日志时目录不能为空");
        }

        if let Some(level_config) = &logging.level_config {
            for (target, level) in &level_config.overrides {
                if !VALID_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                    report.add_warning(
                        &format!("logging.level_config.overrides.{}", target),
                        &format!("无效的日志级别将被忽略: {}", level),
                    );
                }
            }
        }
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(format!("必须以 http:// 或 https:// 开头: {}", raw));
    }
    Url::parse(trimmed)
        .map(|_| ())
        .map_err(|e| format!("URL解析失败: {}", e))
}

/// 验证报告
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    pub fn add_info(&mut self, field: &str, message: &str) {
        self.info.push(ValidationIssue::new(field, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

/// 验证问题
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
