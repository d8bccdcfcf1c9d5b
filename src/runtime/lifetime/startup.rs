use std::sync::Arc;

use tracing::{info, warn};

use crate::api::services::{AppState, LinkBuilder};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::GeoIpProvider;
use crate::storage::StorageFactory;

/// 启动前准备好的共享组件
pub struct StartupContext {
    pub state: Arc<AppState>,
}

/// 打开存储、构造 GeoIP provider，组装 handler 共享状态
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let store = StorageFactory::create(&config.storage).await?;

    match store.link_count().await {
        Ok(count) => info!("Storage ready, {} short links loaded", count),
        Err(e) => warn!("Could not count stored links: {}", e),
    }

    let geoip = GeoIpProvider::new(&config.geoip);
    info!("GeoIP provider: {}", geoip.provider_name());

    let links = LinkBuilder::from(&config.server);
    info!("Short links will be served under {}", links.short_url(""));

    Ok(StartupContext {
        state: Arc::new(AppState::new(store, geoip, links)),
    })
}
