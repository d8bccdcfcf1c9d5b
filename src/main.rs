use std::sync::Arc;

use clap::Parser;
use tracing::info;

use shorturl::cli::Cli;
use shorturl::config::AppConfig;
use shorturl::runtime::modes::run_server;
use shorturl::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    info!(
        "Starting shorturl {} (backend: {})",
        env!("CARGO_PKG_VERSION"),
        config.storage.backend
    );

    run_server(config).await
}
