//! URL storage
//!
//! [`UrlStore`] is the only way the rest of the service touches the
//! alias -> URL mapping and its access statistics. Two backends implement
//! it with identical semantics: [`MemoryStorage`] and [`SeaOrmStorage`]
//! (SQLite through sea-orm).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{StorageConfig, StoreKind};
use crate::errors::{Result, ShorturlError};

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use models::{HISTORY_LIMIT, ImportReport, UNKNOWN_IP, UrlEntry, UrlMapping, UrlStats};

#[async_trait]
pub trait UrlStore: Send + Sync {
    /// 创建或覆盖映射，同时把统计重置为初始状态
    async fn save(&self, alias: &str, url: &str) -> Result<()>;

    async fn get(&self, alias: &str) -> Result<Option<String>>;

    async fn stats(&self, alias: &str) -> Result<Option<UrlStats>>;

    /// 一致地读取映射和统计：要么两者都有，要么都没有
    async fn entry(&self, alias: &str) -> Result<Option<UrlEntry>>;

    /// 只替换目标 URL，统计保持不变
    async fn update_url(&self, alias: &str, new_url: &str) -> Result<()>;

    async fn update_stats(
        &self,
        alias: &str,
        ip: &str,
        referrer: &str,
        geo_location: &str,
    ) -> Result<()>;

    /// 返回清空前的完整映射，并原子地清空两张表
    async fn flush(&self) -> Result<UrlMapping>;

    async fn snapshot(&self) -> Result<UrlMapping>;

    async fn link_count(&self) -> Result<usize>;

    fn backend_name(&self) -> &'static str;

    /// 释放后端资源（关闭连接池等）
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// 统计信息的 JSON 文本
    async fn get_stats(&self, alias: &str) -> Result<Option<String>> {
        match self.stats(alias).await? {
            Some(stats) => Ok(Some(serde_json::to_string(&stats)?)),
            None => Ok(None),
        }
    }

    async fn backup(&self) -> Result<Vec<u8>> {
        let mapping = self.snapshot().await?;
        Ok(serde_json::to_vec(&mapping)?)
    }

    /// 导入 JSON 映射文档
    ///
    /// 文档本身无法解析时整体失败；单条写入失败只记录日志并跳过。
    async fn import(&self, document: &[u8]) -> Result<ImportReport> {
        let mapping: UrlMapping = serde_json::from_slice(document)
            .map_err(|e| ShorturlError::parse(format!("Invalid import document: {}", e)))?;

        let mut report = ImportReport::default();
        for (alias, url) in &mapping {
            match self.save(alias, url).await {
                Ok(()) => report.imported += 1,
                Err(e) => {
                    warn!("Failed to import alias '{}': {}", alias, e);
                    report.failed.push(alias.clone());
                }
            }
        }

        info!(
            "Import finished: {} imported, {} failed",
            report.imported,
            report.failed.len()
        );
        Ok(report)
    }
}

pub(crate) fn ensure_alias(alias: &str) -> Result<()> {
    if alias.is_empty() {
        return Err(ShorturlError::validation("short_url must not be empty"));
    }
    Ok(())
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn UrlStore>> {
        let store: Arc<dyn UrlStore> = match config.backend {
            StoreKind::Memory => Arc::new(MemoryStorage::new()),
            StoreKind::Sqlite => Arc::new(
                SeaOrmStorage::new(&config.database_url, backend::retry::RetryConfig::from(config))
                    .await?,
            ),
        };

        info!("Using storage backend: {}", store.backend_name());
        Ok(store)
    }
}
