use actix_web::{HttpResponse, Responder};
use serde_json::json;
use tracing::trace;

pub struct HealthService;

impl HealthService {
    /// 存活探针，不访问存储
    pub async fn health_check() -> impl Responder {
        trace!("Received health check request");
        HttpResponse::Ok().json(json!({ "status": "ok" }))
    }
}
