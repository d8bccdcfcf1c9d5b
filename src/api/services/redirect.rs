use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error};

use super::AppState;
use crate::errors::{Result, ShorturlError};
use crate::services::shortcode;
use crate::utils::ip::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    /// 按短码跳转，并在跳转前记录一次访问
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        state: web::Data<AppState>,
    ) -> Result<HttpResponse> {
        let alias = path.into_inner();
        let Some(target) = state.store.get(&alias).await? else {
            debug!(
                "Redirect link not found: {} (generated shape: {})",
                alias,
                shortcode::is_short_code(&alias)
            );
            return Err(ShorturlError::not_found(format!(
                "short url not found: {}",
                alias
            )));
        };

        let ip = extract_client_ip(&req);
        let referrer = req
            .headers()
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let geo_location = state.geoip.resolve_label(&ip).await;

        if let Err(e) = state
            .store
            .update_stats(&alias, &ip, referrer, &geo_location)
            .await
        {
            error!("Failed to update stats for {}: {}", alias, e);
            return Err(e);
        }

        Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, target))
            .finish())
    }

    /// 未匹配任何路由（例如根路径）
    pub async fn not_found() -> Result<HttpResponse> {
        Err(ShorturlError::not_found("no route matched"))
    }
}
