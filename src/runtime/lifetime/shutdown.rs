use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::UrlStore;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C，然后在超时内释放存储
pub async fn listen_for_shutdown(store: Arc<dyn UrlStore>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, closing storage...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    close_store(store).await;
}

/// 关闭存储后端；超时或失败只记录日志
pub async fn close_store(store: Arc<dyn UrlStore>) {
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), store.close()).await {
        Ok(Ok(())) => info!("Storage backend '{}' closed", store.backend_name()),
        Ok(Err(e)) => error!("Failed to close storage: {}", e),
        Err(_) => error!(
            "Closing storage timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
