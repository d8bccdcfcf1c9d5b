//! Query operations for SeaOrmStorage
//!
//! Read-only database access.

use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

use super::converters::model_to_stats;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShorturlError};
use crate::storage::{UrlEntry, UrlMapping, UrlStats};

use migration::entities::{url, url_stats};

impl SeaOrmStorage {
    pub(super) async fn find_url(&self, alias: &str) -> Result<Option<String>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("get({})", alias), self.retry_config, || async move {
            url::Entity::find_by_id(alias).one(db).await
        })
        .await
        .map_err(|e| ShorturlError::storage(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(|m| m.original_url))
    }

    pub(super) async fn find_stats(&self, alias: &str) -> Result<Option<UrlStats>> {
        let db = &self.db;

        let model =
            retry::with_retry(&format!("stats({})", alias), self.retry_config, || async move {
                url_stats::Entity::find_by_id(alias).one(db).await
            })
            .await
            .map_err(|e| ShorturlError::storage(format!("查询统计失败: {}", e)))?;

        Ok(model.map(model_to_stats))
    }

    /// 在同一个读事务里取映射和统计
    pub(super) async fn find_entry(&self, alias: &str) -> Result<Option<UrlEntry>> {
        let db = &self.db;

        let pair =
            retry::with_retry(&format!("entry({})", alias), self.retry_config, || async move {
                let txn = db.begin().await?;
                let link = url::Entity::find_by_id(alias).one(&txn).await?;
                let stats = url_stats::Entity::find_by_id(alias).one(&txn).await?;
                txn.commit().await?;
                Ok((link, stats))
            })
            .await
            .map_err(|e| ShorturlError::storage(format!("查询短链接失败: {}", e)))?;

        Ok(match pair {
            (Some(link), Some(stats)) => Some(UrlEntry {
                url: link.original_url,
                stats: model_to_stats(stats),
            }),
            _ => None,
        })
    }

    pub(super) async fn load_all(&self) -> Result<UrlMapping> {
        let db = &self.db;

        let models = retry::with_retry("snapshot", self.retry_config, || async move {
            url::Entity::find().all(db).await
        })
        .await
        .map_err(|e| ShorturlError::storage(format!("加载短链接失败: {}", e)))?;

        Ok(models
            .into_iter()
            .map(|m| (m.short_url, m.original_url))
            .collect())
    }

    pub(super) async fn count_links(&self) -> Result<usize> {
        let db = &self.db;

        let total = retry::with_retry("count", self.retry_config, || async move {
            url::Entity::find().count(db).await
        })
        .await
        .map_err(|e| ShorturlError::storage(format!("统计短链接数量失败: {}", e)))?;

        Ok(total as usize)
    }
}
