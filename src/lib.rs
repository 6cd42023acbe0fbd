pub mod api;
pub mod build_info;
pub mod page;
pub mod provenance;
pub mod server;
pub mod util;

use provenance::BuildMetaResolver;
use util::config::Config;

/// 应用状态结构
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// 构建信息解析器（每次请求重新解析）
    pub resolver: BuildMetaResolver,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let resolver = BuildMetaResolver::from_config(&config.provenance);
        Self { config, resolver }
    }
}
