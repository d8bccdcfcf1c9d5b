//! MaxMind GeoLite2 数据库实现

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::{GeoInfo, GeoIpLookup};
use crate::errors::{Result, ShorturlError};

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindProvider {
    pub fn new(path: &str) -> std::result::Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        let unavailable =
            |reason: String| ShorturlError::geolocation_unavailable(format!("{}: {}", ip, reason));

        let ip_addr: IpAddr = ip
            .parse()
            .map_err(|_| unavailable("not an IP address".to_string()))?;

        let result = self
            .reader
            .lookup(ip_addr)
            .map_err(|e| unavailable(e.to_string()))?;
        let city: maxminddb::geoip2::City = result
            .decode()
            .map_err(|e| unavailable(e.to_string()))?
            .ok_or_else(|| unavailable("no record".to_string()))?;

        let country = city
            .country
            .names
            .english
            .map(|s| s.to_string())
            .or_else(|| city.country.iso_code.map(String::from));
        let city_name = city.city.names.english.map(|s| s.to_string());

        trace!(
            "MaxMind lookup for {}: country={:?}, city={:?}",
            ip, country, city_name
        );

        let info = GeoInfo {
            city: city_name,
            country,
        };
        if info.label().is_none() {
            return Err(unavailable("record has no city or country".to_string()));
        }
        Ok(info)
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
