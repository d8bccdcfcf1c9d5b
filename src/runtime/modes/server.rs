//! Server mode
//!
//! Builds the actix application and runs it until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, Error, HttpServer,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Compress,
    web,
};
use anyhow::Result;
use tracing::{error, warn};

use crate::api::middleware::{CorsHeaders, RequestLogger};
use crate::api::services::{AppState, configure_routes};
use crate::config::AppConfig;
use crate::runtime::lifetime;

/// 组装 actix `App`，服务器和集成测试共用
///
/// CORS 在最外层，预检请求不需要令牌。
pub fn build_app(
    state: web::Data<AppState>,
    token: Arc<str>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Compress::default())
        .wrap(RequestLogger)
        .wrap(CorsHeaders)
        .app_data(state)
        .configure(move |cfg| configure_routes(cfg, token))
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<AppConfig>) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            error!("Server startup failed: {}", e);
            e
        })?;

    let store = startup.state.store.clone();
    let state = web::Data::from(startup.state);
    let token: Arc<str> = Arc::from(config.server.token.as_str());

    let workers = config.server.workers.min(32);
    warn!("Using {} workers for the server", workers);

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || build_app(state.clone(), token.clone()))
        .keep_alive(Duration::from_secs(30))
        .client_request_timeout(Duration::from_millis(5000))
        .client_disconnect_timeout(Duration::from_millis(1000))
        .workers(workers)
        .bind(&bind_address)?;

    warn!("Starting server at http://{}", bind_address);
    let server = server.run();

    tokio::select! {
        res = server => {
            res?;
            lifetime::shutdown::close_store(store).await;
        }
        _ = lifetime::shutdown::listen_for_shutdown(store.clone()) => {
            warn!("Graceful shutdown: storage released");
        }
    }

    Ok(())
}
