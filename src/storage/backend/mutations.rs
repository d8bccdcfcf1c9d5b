//! Mutation operations for SeaOrmStorage
//!
//! Every write holds `write_gate` and runs in a single transaction, so the
//! `urls` and `url_stats` rows always change together.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info};

use super::converters::{model_to_stats, stats_to_active_model, url_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShorturlError};
use crate::storage::{UrlMapping, UrlStats};

use migration::entities::{url, url_stats};

impl SeaOrmStorage {
    pub(super) async fn upsert(&self, alias: &str, original_url: &str) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let db = &self.db;

        retry::with_retry(&format!("save({})", alias), self.retry_config, || async move {
            let txn = db.begin().await?;

            url::Entity::insert(url_to_active_model(alias, original_url))
                .on_conflict(
                    OnConflict::column(url::Column::ShortUrl)
                        .update_column(url::Column::OriginalUrl)
                        .to_owned(),
                )
                .exec(&txn)
                .await?;

            url_stats::Entity::insert(stats_to_active_model(alias, &UrlStats::default()))
                .on_conflict(
                    OnConflict::column(url_stats::Column::ShortUrl)
                        .update_columns([
                            url_stats::Column::Count,
                            url_stats::Column::LastIps,
                            url_stats::Column::Referrers,
                            url_stats::Column::LastGeoLocation,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;

            txn.commit().await
        })
        .await
        .map_err(|e| ShorturlError::storage(format!("保存短链接 '{}' 失败: {}", alias, e)))?;

        debug!("Short link saved: {}", alias);
        Ok(())
    }

    pub(super) async fn replace_url(&self, alias: &str, new_url: &str) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let db = &self.db;

        let result =
            retry::with_retry(&format!("update({})", alias), self.retry_config, || async move {
                url::Entity::update_many()
                    .col_expr(url::Column::OriginalUrl, Expr::value(new_url.to_string()))
                    .filter(url::Column::ShortUrl.eq(alias))
                    .exec(db)
                    .await
            })
            .await
            .map_err(|e| ShorturlError::storage(format!("更新短链接失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(ShorturlError::not_found(format!(
                "short url not found: {}",
                alias
            )));
        }

        info!("Short link updated: {}", alias);
        Ok(())
    }

    /// 在写事务内读-改-写统计行
    pub(super) async fn record_visit(
        &self,
        alias: &str,
        ip: &str,
        referrer: &str,
        geo_location: &str,
    ) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let db = &self.db;

        let found =
            retry::with_retry(&format!("visit({})", alias), self.retry_config, || async move {
                let txn = db.begin().await?;

                let Some(model) = url_stats::Entity::find_by_id(alias).one(&txn).await? else {
                    txn.rollback().await?;
                    return Ok(false);
                };

                let mut stats = model_to_stats(model);
                stats.record_visit(ip, referrer, geo_location);
                stats_to_active_model(alias, &stats).update(&txn).await?;

                txn.commit().await?;
                Ok(true)
            })
            .await
            .map_err(|e| ShorturlError::storage(format!("更新统计失败: {}", e)))?;

        if !found {
            return Err(ShorturlError::not_found(format!(
                "short url not found: {}",
                alias
            )));
        }
        Ok(())
    }

    pub(super) async fn drain(&self) -> Result<UrlMapping> {
        let _gate = self.write_gate.lock().await;
        let db = &self.db;

        let models = retry::with_retry("flush", self.retry_config, || async move {
            let txn = db.begin().await?;
            let models = url::Entity::find().all(&txn).await?;
            url_stats::Entity::delete_many().exec(&txn).await?;
            url::Entity::delete_many().exec(&txn).await?;
            txn.commit().await?;
            Ok(models)
        })
        .await
        .map_err(|e| ShorturlError::storage(format!("清空短链接失败: {}", e)))?;

        info!("Flushed {} short links from database", models.len());
        Ok(models
            .into_iter()
            .map(|m| (m.short_url, m.original_url))
            .collect())
    }
}
