//! SeaORM storage backend
//!
//! SQLite through sea-orm. Writes are serialized by a process-local gate and
//! each one runs inside a transaction; reads go straight to the pool.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{UrlEntry, UrlMapping, UrlStats, UrlStore, ensure_alias};
use crate::errors::{Result, ShorturlError};

pub use connection::{connect_sqlite, run_migrations};
pub use converters::{decode_list, encode_list};

/// SeaORM-based storage backend
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    retry_config: retry::RetryConfig,
    write_gate: Mutex<()>,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, retry_config: retry::RetryConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ShorturlError::config("database_url 未设置"));
        }

        let db = connect_sqlite(database_url).await?;
        run_migrations(&db).await?;

        warn!("SQLITE Storage initialized.");
        Ok(Self {
            db,
            retry_config,
            write_gate: Mutex::new(()),
        })
    }
}

#[async_trait]
impl UrlStore for SeaOrmStorage {
    async fn save(&self, alias: &str, url: &str) -> Result<()> {
        ensure_alias(alias)?;
        self.upsert(alias, url).await
    }

    async fn get(&self, alias: &str) -> Result<Option<String>> {
        self.find_url(alias).await
    }

    async fn stats(&self, alias: &str) -> Result<Option<UrlStats>> {
        self.find_stats(alias).await
    }

    async fn entry(&self, alias: &str) -> Result<Option<UrlEntry>> {
        self.find_entry(alias).await
    }

    async fn update_url(&self, alias: &str, new_url: &str) -> Result<()> {
        self.replace_url(alias, new_url).await
    }

    async fn update_stats(
        &self,
        alias: &str,
        ip: &str,
        referrer: &str,
        geo_location: &str,
    ) -> Result<()> {
        self.record_visit(alias, ip, referrer, geo_location).await
    }

    async fn flush(&self) -> Result<UrlMapping> {
        self.drain().await
    }

    async fn snapshot(&self) -> Result<UrlMapping> {
        self.load_all().await
    }

    async fn link_count(&self) -> Result<usize> {
        self.count_links().await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| ShorturlError::storage(format!("关闭数据库连接失败: {}", e)))?;
        info!("Database connection closed");
        Ok(())
    }
}
