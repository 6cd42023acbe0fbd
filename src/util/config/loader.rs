//! 配置加载和管理模块
//! 处理配置文件的读取、写入、环境变量覆盖和默认值生成

use super::types::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从YAML文件读取配置
    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config = serde_yaml::from_str(&config_str)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 从进程环境变量读取配置覆盖
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// 从任意查找函数读取配置覆盖
    pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::debug!("[tool] 应用环境变量配置覆盖...");

        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // 服务器配置覆盖
        if let Some(host) = var("RECEIPT_HOST") {
            tracing::info!("[ok] 环境变量覆盖服务器地址: {}", host);
            config.server.host = host;
        }

        if let Some(port_str) = var("RECEIPT_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => {
                    config.server.port = port;
                    tracing::info!("[ok] 环境变量覆盖服务器端口: {}", port);
                }
                Err(_) => tracing::warn!("[warn] RECEIPT_PORT 无效: {}", port_str),
            }
        }

        if let Some(level) = var("RECEIPT_LOG_LEVEL") {
            config.logging.level = level.to_ascii_lowercase();
            tracing::info!("[ok] 环境变量覆盖日志级别: {}", config.logging.level);
        }

        // 来源解析配置覆盖
        if let Some(program) = var("RECEIPT_GIT_PROGRAM") {
            tracing::info!("[ok] 环境变量覆盖git程序: {}", program);
            config.provenance.git_program = program;
        }

        if let Some(dir) = var("RECEIPT_REPO_DIR") {
            tracing::info!("[ok] 环境变量覆盖仓库目录: {}", dir);
            config.provenance.repo_dir = Some(dir);
        }

        if let Some(remote) = var("RECEIPT_REMOTE_NAME") {
            tracing::info!("[ok] 环境变量覆盖远程名称: {}", remote);
            config.provenance.remote_name = remote;
        }

        if let Some(web_host) = var("RECEIPT_WEB_HOST") {
            tracing::info!("[ok] 环境变量覆盖站点地址: {}", web_host);
            config.provenance.web_host = web_host;
        }

        if let Some(timeout_str) = var("RECEIPT_COMMAND_TIMEOUT_MS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout_ms) => {
                    config.provenance.command_timeout_ms = timeout_ms;
                    tracing::info!("[ok] 环境变量覆盖命令超时: {}ms", timeout_ms);
                }
                Err(_) => tracing::warn!(
                    "[warn] RECEIPT_COMMAND_TIMEOUT_MS 无法解析为整数: {}",
                    timeout_str
                ),
            }
        }

        if let Some(output) = var("RECEIPT_OUTPUT_PATH") {
            tracing::info!("[ok] 环境变量覆盖页面输出路径: {}", output);
            config.page.output_path = output;
        }

        config
    }

    /// 配置加载（配置文件 + 环境变量覆盖）
    pub fn load_with_env_overrides(path: impl AsRef<Path>) -> Result<Config> {
        let base_config = Self::read_yaml(path)?;
        Ok(Self::apply_env_overrides(base_config))
    }
}

/// 配置写入器
pub struct ConfigWriter;

impl ConfigWriter {
    /// 写入配置到指定路径，确保目录存在
    pub fn write_yaml_with_dir(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let yaml_content = serde_yaml::to_string(config)?;
        fs::write(path, yaml_content)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
        Ok(())
    }
}
