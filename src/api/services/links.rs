//! 短链接的创建、查询和修改

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::AppState;
use crate::errors::{Result, ShorturlError};
use crate::services::shortcode;

/// 生成短码时遇到已占用短码的最大重试次数
pub const SHORTEN_MAX_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct ShortenQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub short_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuery {
    pub short_url: Option<String>,
    pub new_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub url: String,
    pub message: String,
}

pub struct LinkService;

impl LinkService {
    pub async fn shorten(
        state: web::Data<AppState>,
        query: web::Query<ShortenQuery>,
    ) -> Result<HttpResponse> {
        let url = non_empty(query.into_inner().url)
            .ok_or_else(|| ShorturlError::validation("URL parameter is missing"))?;

        let alias = Self::allocate_alias(&state).await?;
        state.store.save(&alias, &url).await?;

        let short_url = state.links.short_url(&alias);
        info!(alias = %alias, url = %url, "URL shortened");
        Ok(HttpResponse::Ok().json(ShortenResponse { short_url }))
    }

    pub async fn stats(
        state: web::Data<AppState>,
        query: web::Query<StatsQuery>,
    ) -> Result<HttpResponse> {
        // 缺少参数按请求错误处理（400），不与"短链接不存在"（404）混用
        let alias = non_empty(query.into_inner().short_url)
            .ok_or_else(|| ShorturlError::validation("short_url parameter is missing"))?;

        match state.store.get_stats(&alias).await? {
            Some(body) => Ok(HttpResponse::Ok()
                .content_type("application/json")
                .body(body)),
            None => {
                debug!("Stats requested for unknown alias: {}", alias);
                Err(ShorturlError::not_found(format!(
                    "short url not found: {}",
                    alias
                )))
            }
        }
    }

    pub async fn update(
        state: web::Data<AppState>,
        query: web::Query<UpdateQuery>,
    ) -> Result<HttpResponse> {
        let UpdateQuery { short_url, new_url } = query.into_inner();
        let (alias, new_url) = match (non_empty(short_url), non_empty(new_url)) {
            (Some(alias), Some(new_url)) => (alias, new_url),
            _ => {
                return Err(ShorturlError::validation(
                    "Both short_url and new_url parameters are required",
                ));
            }
        };

        state.store.update_url(&alias, &new_url).await?;

        info!(alias = %alias, url = %new_url, "URL updated");
        Ok(HttpResponse::Ok().json(UpdateResponse {
            url: alias,
            message: "URL updated successfully".to_string(),
        }))
    }

    /// 生成一个当前未被占用的短码
    async fn allocate_alias(state: &AppState) -> Result<String> {
        for attempt in 1..=SHORTEN_MAX_ATTEMPTS {
            let alias = shortcode::generate()?;
            if state.store.get(&alias).await?.is_none() {
                return Ok(alias);
            }
            warn!(
                "Generated short code '{}' already taken (attempt {}/{})",
                alias, attempt, SHORTEN_MAX_ATTEMPTS
            );
        }
        Err(ShorturlError::storage(format!(
            "could not allocate a free short code after {} attempts",
            SHORTEN_MAX_ATTEMPTS
        )))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
