//! 配置结构定义模块
//! 包含系统配置的所有数据结构

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provenance: ProvenanceConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn get_port(&self) -> u16 {
        self.server.port
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// HTTP服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// 构建来源解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    /// git 可执行文件
    #[serde(default = "default_git_program")]
    pub git_program: String,
    /// 执行 git 的工作目录，None 表示当前目录
    #[serde(default)]
    pub repo_dir: Option<String>,
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
    /// 由仓库标识拼接仓库/提交链接时使用的站点
    #[serde(default = "default_web_host")]
    pub web_host: String,
    /// 单条 git 命令的超时（毫秒）
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            git_program: default_git_program(),
            repo_dir: None,
            remote_name: default_remote_name(),
            web_host: default_web_host(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_web_host() -> String {
    "https://github.com".to_string()
}

fn default_command_timeout_ms() -> u64 {
    2000
}

/// 页面展示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_factory_name")]
    pub factory_name: String,
    #[serde(default = "default_factory_url")]
    pub factory_url: String,
    /// `render` 子命令的默认输出文件
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            factory_name: default_factory_name(),
            factory_url: default_factory_url(),
            output_path: default_output_path(),
        }
    }
}

fn default_title() -> String {
    "Repo Mode Proof".to_string()
}

fn default_description() -> String {
    "THIS APP EXISTS BECAUSE A REPO BUILT IT.".to_string()
}

fn default_factory_name() -> String {
    "App Factory".to_string()
}

fn default_factory_url() -> String {
    "https://appfactory.fun".to_string()
}

fn default_output_path() -> String {
    "dist/index.html".to_string()
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 是否输出 JSON 结构化日志
    #[serde(default)]
    pub structured: Option<bool>,
    #[serde(default)]
    pub file: LogFileConfig,
    #[serde(default)]
    pub level_config: Option<LevelConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            structured: Some(false),
            file: LogFileConfig::default(),
            level_config: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 日志文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFileConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default)]
    pub retention_days: Option<u32>,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_log_directory(),
            retention_days: Some(7),
        }
    }
}

fn default_log_directory() -> String {
    "runtime/logs".to_string()
}

/// 分模块日志级别
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelConfig {
    /// 解析器（git 查询）日志级别
    #[serde(default)]
    pub provenance: Option<String>,
    /// HTTP 层日志级别
    #[serde(default)]
    pub http: Option<String>,
    /// target => level，例如 `page: debug` 或 `target:tower_http: warn`
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}
