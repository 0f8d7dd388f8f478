//! Stock Signal dev backend
//!
//! In-memory implementation of the dashboard's REST API backed by synthetic
//! market data. Not for production use.

use dotenvy::dotenv;
use stocksignal::config;
use stocksignal::core::http::start_server;
use stocksignal::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging();

    let port = config::get_backend_port();
    let env = config::get_environment();
    info!("Starting Stock Signal dev backend");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down dev backend...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
