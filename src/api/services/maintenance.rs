//! 批量维护：清空、备份、导入

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, info};

use super::AppState;
use crate::errors::{Result, ShorturlError};

#[derive(Debug, Serialize)]
struct ImportResponse {
    message: &'static str,
    imported: usize,
    failed: Vec<String>,
}

pub struct MaintenanceService;

impl MaintenanceService {
    /// 清空全部数据，响应体是清空前的映射
    pub async fn flush(state: web::Data<AppState>) -> Result<HttpResponse> {
        let removed = state.store.flush().await?;
        info!("Store flushed, {} mappings removed", removed.len());
        Ok(HttpResponse::Ok().json(removed))
    }

    pub async fn backup(state: web::Data<AppState>) -> Result<HttpResponse> {
        let document = state.store.backup().await?;
        Ok(HttpResponse::Ok()
            .content_type("application/json")
            .body(document))
    }

    pub async fn import(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse> {
        let report = state.store.import(&body).await.map_err(|e| {
            error!("Import rejected: {}", e);
            match e {
                ShorturlError::Parse(_) => ShorturlError::parse("Failed to import URLs"),
                other => other,
            }
        })?;

        Ok(HttpResponse::Ok().json(ImportResponse {
            message: "URLs imported successfully",
            imported: report.imported,
            failed: report.failed,
        }))
    }
}
