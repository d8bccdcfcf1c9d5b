//! In-memory storage backend
//!
//! Both maps live behind one `RwLock`, so every write changes them together
//! and readers never observe a mapping without its statistics.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{UrlEntry, UrlMapping, UrlStats, UrlStore, ensure_alias};
use crate::errors::{Result, ShorturlError};

#[derive(Default)]
struct Tables {
    urls: HashMap<String, String>,
    stats: HashMap<String, UrlStats>,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlStore for MemoryStorage {
    async fn save(&self, alias: &str, url: &str) -> Result<()> {
        ensure_alias(alias)?;

        let mut tables = self.tables.write();
        tables.urls.insert(alias.to_string(), url.to_string());
        tables.stats.insert(alias.to_string(), UrlStats::default());
        debug!("Short link saved: {}", alias);
        Ok(())
    }

    async fn get(&self, alias: &str) -> Result<Option<String>> {
        Ok(self.tables.read().urls.get(alias).cloned())
    }

    async fn stats(&self, alias: &str) -> Result<Option<UrlStats>> {
        Ok(self.tables.read().stats.get(alias).cloned())
    }

    async fn entry(&self, alias: &str) -> Result<Option<UrlEntry>> {
        let tables = self.tables.read();
        let entry = match (tables.urls.get(alias), tables.stats.get(alias)) {
            (Some(url), Some(stats)) => Some(UrlEntry {
                url: url.clone(),
                stats: stats.clone(),
            }),
            _ => None,
        };
        Ok(entry)
    }

    async fn update_url(&self, alias: &str, new_url: &str) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.urls.get_mut(alias) {
            Some(url) => {
                *url = new_url.to_string();
                info!("Short link updated: {}", alias);
                Ok(())
            }
            None => Err(ShorturlError::not_found(format!(
                "short url not found: {}",
                alias
            ))),
        }
    }

    async fn update_stats(
        &self,
        alias: &str,
        ip: &str,
        referrer: &str,
        geo_location: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.stats.get_mut(alias) {
            Some(stats) => {
                stats.record_visit(ip, referrer, geo_location);
                Ok(())
            }
            None => Err(ShorturlError::not_found(format!(
                "short url not found: {}",
                alias
            ))),
        }
    }

    async fn flush(&self) -> Result<UrlMapping> {
        let taken = std::mem::take(&mut *self.tables.write());
        info!("Flushed {} short links from memory", taken.urls.len());
        Ok(taken.urls.into_iter().collect())
    }

    async fn snapshot(&self) -> Result<UrlMapping> {
        let tables = self.tables.read();
        Ok(tables
            .urls
            .iter()
            .map(|(alias, url)| (alias.clone(), url.clone()))
            .collect())
    }

    async fn link_count(&self) -> Result<usize> {
        Ok(self.tables.read().urls.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
