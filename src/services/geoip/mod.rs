//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能，支持：
//! - MaxMind GeoLite2 本地数据库
//! - 外部 HTTP API (默认 ip-api.com)
//!
//! 查询本身是可失败的；只有调用方 [`GeoIpProvider::resolve_label`] 会把失败
//! 折算成 `"Unknown"`。

mod external_api;
mod maxmind;
mod provider;

pub use external_api::{ExternalApiProvider, parse_api_response};
pub use maxmind::MaxMindProvider;
pub use provider::{DisabledProvider, GeoInfo, GeoIpLookup, GeoIpProvider, UNKNOWN_LOCATION};
