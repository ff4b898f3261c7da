//! Stockcast API Server
//!
//! Serves the ticker catalog, historical prices, predictions, projected
//! paths, rankings, recommendations and favorites over HTTP.

use dotenvy::dotenv;
use stockcast::config;
use stockcast::core::http::start_server;
use stockcast::logging;
use tracing::{info, warn};

/// Resolves on ctrl-c, or SIGTERM where the platform has it
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv().is_ok();
    let log_format = logging::init_logging();

    let port = config::get_port();
    info!(
        environment = %config::get_environment(),
        log_format = ?log_format,
        dotenv = dotenv_loaded,
        port,
        "Starting Stockcast API Server"
    );
    match config::get_api_base_url() {
        Some(url) => info!(api_base_url = %url, "Market data source: remote API"),
        None => info!(
            latency_ms = config::get_mock_latency().as_millis() as u64,
            "Market data source: mock generator"
        ),
    }

    start_server(port, shutdown_signal()).await?;
    info!("API server stopped");
    Ok(())
}
