//! GeoIP Provider 抽象层
//!
//! 根据配置选择实现：
//! 1. 关闭 → DisabledProvider
//! 2. maxminddb_path 已配置且可读 → MaxMindProvider
//! 3. 否则 → ExternalApiProvider

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::errors::{Result, ShorturlError};
use crate::utils::ip::is_private_or_local;

/// 查询失败时记录的地理位置
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl GeoInfo {
    /// `"city, country"`，缺失的部分省略
    pub fn label(&self) -> Option<String> {
        let city = self.city.as_deref().filter(|s| !s.is_empty());
        let country = self.country.as_deref().filter(|s| !s.is_empty());
        match (city, country) {
            (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo>;

    /// provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 关闭地理位置查询时使用
pub struct DisabledProvider;

#[async_trait]
impl GeoIpLookup for DisabledProvider {
    async fn lookup(&self, _ip: &str) -> Result<GeoInfo> {
        Err(ShorturlError::geolocation_unavailable(
            "geolocation lookup is disabled",
        ))
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// 统一 GeoIP Provider
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
    timeout: Duration,
}

impl GeoIpProvider {
    pub fn new(config: &GeoIpConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);

        let inner: Arc<dyn GeoIpLookup> = if !config.enabled {
            Arc::new(DisabledProvider)
        } else if let Some(ref path) = config.maxminddb_path {
            match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to external API",
                        path, e
                    );
                    Arc::new(ExternalApiProvider::new(&config.api_url, timeout))
                }
            }
        } else {
            debug!("GeoIP: No MaxMind database configured, using external API");
            Arc::new(ExternalApiProvider::new(&config.api_url, timeout))
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner, timeout }
    }

    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// 带超时的查询
    pub async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        match tokio::time::timeout(self.timeout, self.inner.lookup(ip)).await {
            Ok(result) => result,
            Err(_) => Err(ShorturlError::geolocation_unavailable(format!(
                "lookup for {} timed out after {} ms",
                ip,
                self.timeout.as_millis()
            ))),
        }
    }

    /// 解析为统计里记录的标签，任何失败都返回 [`UNKNOWN_LOCATION`]
    pub async fn resolve_label(&self, ip: &str) -> String {
        let Ok(addr) = ip.parse::<IpAddr>() else {
            debug!("GeoIP: '{}' is not an IP address", ip);
            return UNKNOWN_LOCATION.to_string();
        };
        if is_private_or_local(&addr) {
            return UNKNOWN_LOCATION.to_string();
        }

        match self.lookup(ip).await {
            Ok(info) => info.label().unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            Err(e) => {
                debug!("GeoIP ({}) lookup failed: {}", self.inner.name(), e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_formats() {
        let full = GeoInfo {
            city: Some("Lisbon".into()),
            country: Some("Portugal".into()),
        };
        assert_eq!(full.label().as_deref(), Some("Lisbon, Portugal"));

        let country_only = GeoInfo {
            city: Some(String::new()),
            country: Some("Portugal".into()),
        };
        assert_eq!(country_only.label().as_deref(), Some("Portugal"));

        assert_eq!(GeoInfo::default().label(), None);
    }

    #[tokio::test]
    async fn test_disabled_provider_resolves_unknown() {
        let provider = GeoIpProvider::with_lookup(Arc::new(DisabledProvider), Duration::from_secs(1));
        assert!(provider.lookup("8.8.8.8").await.is_err());
        assert_eq!(provider.resolve_label("8.8.8.8").await, UNKNOWN_LOCATION);
    }
}
