//! Stock Signal Dashboard
//!
//! Terminal client for the stock signal backend. Reads commands from stdin
//! and renders each screen to stdout; logs go to stderr.

use dotenvy::dotenv;
use std::sync::Arc;
use stocksignal::config::{self, DashboardConfig};
use stocksignal::core::{DashboardRuntime, RuntimeConfig};
use stocksignal::logging::{self, LogTarget};
use stocksignal::services::{ApiClient, LocalStore};
use stocksignal::views::AppShell;
use tokio::io::{self, BufReader};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    logging::init_logging_to(LogTarget::Stderr);

    let settings = DashboardConfig::from_env()?;
    info!(
        environment = %config::get_environment(),
        api_url = %settings.api_url,
        "Starting Stock Signal Dashboard"
    );

    let client = ApiClient::new(settings.api_url.clone())?;
    let local = LocalStore::in_dir(&settings.state_dir);
    let shell = AppShell::new(Arc::new(client), local, settings);
    let mut runtime = DashboardRuntime::new(shell, RuntimeConfig::default());

    let stdin = BufReader::new(io::stdin());
    let stdout = io::stdout();

    tokio::select! {
        result = runtime.run(stdin, stdout) => {
            if let Err(e) = result {
                error!(error = %e, "Dashboard I/O error");
                return Err(e.into());
            }
        }
        _ = signal::ctrl_c() => {
            info!("Interrupted, shutting down...");
        }
    }

    runtime.shutdown();
    info!("Dashboard stopped");
    Ok(())
}
