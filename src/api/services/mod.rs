//! HTTP handlers and route table

pub mod health;
pub mod links;
pub mod maintenance;
pub mod redirect;

pub use health::HealthService;
pub use links::{LinkService, SHORTEN_MAX_ATTEMPTS};
pub use maintenance::MaintenanceService;
pub use redirect::RedirectService;

use std::sync::Arc;

use actix_web::web;

use crate::api::middleware::TokenAuth;
use crate::config::ServerConfig;
use crate::services::GeoIpProvider;
use crate::storage::UrlStore;

/// import 请求体上限
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// 构造对外短链接
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base, alias)
    }
}

impl From<&ServerConfig> for LinkBuilder {
    fn from(server: &ServerConfig) -> Self {
        Self::new(server.public_base())
    }
}

/// 所有 handler 共享的依赖
pub struct AppState {
    pub store: Arc<dyn UrlStore>,
    pub geoip: GeoIpProvider,
    pub links: LinkBuilder,
}

impl AppState {
    pub fn new(store: Arc<dyn UrlStore>, geoip: GeoIpProvider, links: LinkBuilder) -> Self {
        Self {
            store,
            geoip,
            links,
        }
    }
}

/// 注册全部路由；需要令牌的资源各自包一层 [`TokenAuth`]
///
/// 所有路由接受任意 HTTP 方法。`/{alias}` 最后注册，兜住其余路径。
pub fn configure_routes(cfg: &mut web::ServiceConfig, token: Arc<str>) {
    let auth = || TokenAuth::new(token.clone());

    cfg.app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .service(
            web::resource("/shorten")
                .wrap(auth())
                .route(web::route().to(LinkService::shorten)),
        )
        .service(
            web::resource("/stats")
                .wrap(auth())
                .route(web::route().to(LinkService::stats)),
        )
        .service(
            web::resource("/update")
                .wrap(auth())
                .route(web::route().to(LinkService::update)),
        )
        .service(
            web::resource("/flush")
                .wrap(auth())
                .route(web::route().to(MaintenanceService::flush)),
        )
        .service(
            web::resource("/backup")
                .wrap(auth())
                .route(web::route().to(MaintenanceService::backup)),
        )
        .service(
            web::resource("/import")
                .wrap(auth())
                .route(web::route().to(MaintenanceService::import)),
        )
        .service(web::resource("/health").route(web::route().to(HealthService::health_check)))
        .service(web::resource("/{alias:.+}").route(web::route().to(RedirectService::handle_redirect)))
        .default_service(web::to(RedirectService::not_found));
}
