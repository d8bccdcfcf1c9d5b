//! 外部 GeoIP API 实现
//!
//! 默认请求 `http://ip-api.com/json/{ip}`。成功结果按 IP 缓存（TTL + 容量上限），
//! 同一 IP 的并发查询只发一次 HTTP；失败不缓存。

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};
use crate::errors::{Result, ShorturlError};

/// GeoIP 缓存 TTL（15 分钟）
const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
/// GeoIP 缓存最大容量
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;

pub struct ExternalApiProvider {
    api_url_template: String,
    agent: Agent,
    cache: Cache<String, GeoInfo>,
}

impl ExternalApiProvider {
    /// `api_url_template` 使用 `{ip}` 作为占位符
    pub fn new(api_url_template: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_url_template: api_url_template.to_string(),
            agent,
            cache,
        }
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_from_api_sync(agent: Agent, url: String) -> Result<GeoInfo> {
        let resp = agent.get(&url).call().map_err(|e| {
            warn!("GeoIP API request to \"{}\" failed: {}", url, e);
            ShorturlError::geolocation_unavailable(format!("request failed: {}", e))
        })?;

        let json: serde_json::Value = resp.into_body().read_json().map_err(|e| {
            warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
            ShorturlError::geolocation_unavailable(format!("invalid response: {}", e))
        })?;

        parse_api_response(&json)
    }

    async fn fetch_from_api(&self, ip: &str) -> Result<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", ip);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || Self::fetch_from_api_sync(agent, url))
            .await
            .map_err(|e| {
                ShorturlError::geolocation_unavailable(format!("lookup task failed: {}", e))
            })?
    }
}

/// 解析 ip-api.com 风格的响应
///
/// 带 `status` 字段时必须是 `"success"`；城市和国家都缺失视为失败。
pub fn parse_api_response(json: &serde_json::Value) -> Result<GeoInfo> {
    if let Some(status) = json["status"].as_str()
        && status != "success"
    {
        let reason = json["message"].as_str().unwrap_or(status);
        return Err(ShorturlError::geolocation_unavailable(format!(
            "API returned {}",
            reason
        )));
    }

    let country = json["country"]
        .as_str()
        .or_else(|| json["countryCode"].as_str())
        .or_else(|| json["country_code"].as_str())
        .map(String::from);
    let city = json["city"].as_str().map(String::from);

    trace!("External API lookup: city={:?}, country={:?}", city, country);

    let info = GeoInfo { city, country };
    if info.label().is_none() {
        return Err(ShorturlError::geolocation_unavailable(
            "API response has no city or country",
        ));
    }
    Ok(info)
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        // try_get_with 自带 singleflight 语义，且只缓存 Ok
        self.cache
            .try_get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch_from_api(ip).await
            })
            .await
            .map_err(|e| (*e).clone())
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
