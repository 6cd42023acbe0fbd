//! 配置管理模块
//! 负责配置文件的查找、加载、验证和日志初始化

use crate::util::config::{Config, ConfigLoader, ConfigValidator, ValidationReport};
use crate::util::log::log_init_with_config;
use crate::util::logging::standards::events;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const CONFIG_FILE_NAME: &str = "config.yaml";
const LOG_FILE_PREFIX: &str = "build-receipt";

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 加载和验证配置
    pub fn load_and_validate() -> Result<(Config, ValidationReport)> {
        let config_path = Self::find_config_file_path(CONFIG_FILE_NAME);
        Self::load_and_validate_from(&config_path)
    }

    /// 只读加载：配置文件缺失时不写出模板
    pub fn load_read_only() -> Result<Config> {
        let config_path = Self::find_config_file_path(CONFIG_FILE_NAME);
        Self::load_read_only_from(&config_path)
    }

    /// 从指定路径加载和验证配置
    pub fn load_and_validate_from(config_path: &Path) -> Result<(Config, ValidationReport)> {
        Self::load_from(config_path, true)
    }

    pub fn load_read_only_from(config_path: &Path) -> Result<Config> {
        Self::load_from(config_path, false).map(|(config, _)| config)
    }

    fn load_from(config_path: &Path, write_template: bool) -> Result<(Config, ValidationReport)> {
        let config = if config_path.exists() {
            ConfigLoader::load_with_env_overrides(config_path)?
        } else if write_template {
            Self::handle_missing_config(config_path)
        } else {
            ConfigLoader::apply_env_overrides(Config::default())
        };
        info!(event = events::CONFIG_LOADED, path = %config_path.display());

        let report = ConfigValidator::validate_all(&config);
        for warning in &report.warnings {
            warn!("  - {}: {}", warning.field, warning.message);
        }
        if report.has_errors() {
            for error in &report.errors {
                warn!(
                    event = events::CONFIG_INVALID,
                    field = %error.field,
                    message = %error.message
                );
            }
            return Err(anyhow::anyhow!(
                "配置验证失败: {} 个错误 ({})",
                report.error_count(),
                config_path.display()
            ));
        }

        Ok((config, report))
    }

    /// 初始化日志系统
    pub fn initialize_logging(config: &Config) -> Result<Option<WorkerGuard>> {
        log_init_with_config(LOG_FILE_PREFIX, &config.logging)
    }

    /// 查找配置文件路径，适应开发和生产环境
    pub fn find_config_file_path(filename: &str) -> PathBuf {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let exe_path = std::env::current_exe().ok();

        // 情况1：当前目录下的 config/
        let config_in_current = current_dir.join("config").join(filename);
        if config_in_current.exists() {
            return config_in_current;
        }

        // 情况2：在 bin/ 目录运行时，上级目录的 config/
        if let Some(parent) = current_dir.parent() {
            let config_in_parent = parent.join("config").join(filename);
            if config_in_parent.exists() {
                return config_in_parent;
            }
        }

        // 情况3：可执行文件位于 bin/ 时，项目根目录的 config/
        if let Some(exe_dir) = exe_path.as_deref().and_then(Path::parent) {
            if exe_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
                if let Some(project_root) = exe_dir.parent() {
                    let config_in_root = project_root.join("config").join(filename);
                    if config_in_root.exists() {
                        return config_in_root;
                    }
                }
            }
        }

        // 情况4：当前目录
        current_dir.join(filename)
    }

    /// 配置文件不存在：写出默认模板并以默认值 + 环境变量运行
    fn handle_missing_config(config_path: &Path) -> Config {
        let config = Config::default();
        match config.write_yaml_to_path(config_path) {
            Ok(()) => info!(
                event = events::CONFIG_TEMPLATE_WRITTEN,
                path = %config_path.display()
            ),
            Err(e) => warn!("[fail] 创建默认配置文件失败: {}", e),
        }
        ConfigLoader::apply_env_overrides(config)
    }
}
