//! 服务器模块
//!
//! - 配置管理 (config.rs)
//! - HTTP服务器设置 (http.rs)
//!
//! 使用示例：
//! ```rust,no_run
//! use build_receipt::server::ServerBootstrap;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let server = ServerBootstrap::new()?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;

pub use config::ConfigManager;
pub use http::{HttpServer, ServerManager};

use crate::build_info;
use crate::page::ReceiptPageGenerator;
use crate::provenance::BuildMetaResolver;
use crate::util::config::{Config, ValidationReport};
use crate::AppState;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// 服务器引导程序 - 统一的启动入口
pub struct ServerBootstrap {
    config: Config,
    validation_report: ValidationReport,
    _log_guard: Option<WorkerGuard>,
}

impl ServerBootstrap {
    /// 加载配置并初始化日志
    pub fn new() -> Result<Self> {
        let (config, validation_report) = ConfigManager::load_and_validate()?;
        let log_guard = ConfigManager::initialize_logging(&config)?;

        for item in &validation_report.info {
            info!("  - {}: {}", item.field, item.message);
        }
        info!("[ok] 服务器引导程序初始化完成");

        Ok(Self {
            config,
            validation_report,
            _log_guard: log_guard,
        })
    }

    /// 启动服务器，阻塞直到关闭
    pub async fn start(self) -> Result<()> {
        info!("=== 构建回执服务启动 ===");
        info!("版本信息: {}", build_info::summary());
        info!("服务地址: {}", self.config.bind_address());
        if self.validation_report.has_warnings() {
            info!("配置存在 {} 条警告", self.validation_report.warnings.len());
        }

        let app_state = AppState::new(self.config.clone());
        let server = ServerManager::create_server(&self.config, app_state).await?;
        ServerManager::start_server(server).await
    }

    /// 渲染一次页面并写入文件
    pub fn render_once(&self, output: Option<&Path>) -> Result<PathBuf> {
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.page.output_path));

        let meta = BuildMetaResolver::from_config(&self.config.provenance).resolve();
        ReceiptPageGenerator::write_to_file(&meta, &self.config.page, &path)?;
        Ok(path)
    }
}

/// 启动HTTP服务
pub async fn start_server() -> Result<()> {
    let bootstrap = ServerBootstrap::new()?;
    bootstrap.start().await
}

/// 渲染静态页面到文件
pub fn render_page(output: Option<&Path>) -> Result<PathBuf> {
    let bootstrap = ServerBootstrap::new()?;
    let path = bootstrap.render_once(output)?;
    info!("[ok] 页面已生成: {}", path.display());
    Ok(path)
}

/// 以 JSON 输出构建信息；不初始化日志，也不写出配置模板
pub fn print_json() -> Result<()> {
    let config = ConfigManager::load_read_only()?;
    let meta = BuildMetaResolver::from_config(&config.provenance).resolve();
    let output = serde_json::to_string_pretty(&meta).context("序列化构建信息失败")?;
    println!("{}", output);
    Ok(())
}
