//! People counter HTTP server binary.
//!
//! Loads configuration, starts polling the counting API and serves the
//! dashboard API.
//!
//! # Usage
//!
//! ```bash
//! # Use ./counter.toml (or built-in defaults)
//! cargo run --bin counter-server
//!
//! # Point at another config file and upstream
//! COUNTER_CONFIG=/etc/counter.toml \
//!   COUNTER_ENDPOINT=http://localhost:9000/grouped \
//!   cargo run --bin counter-server
//! ```
//!
//! # Environment Variables
//!
//! - `COUNTER_CONFIG`: path to the TOML configuration file
//! - `COUNTER_ENDPOINT`, `COUNTER_TIMEZONE`, `COUNTER_REFRESH_SECS`: override config values
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use people_counter::config::DashboardConfig;
use people_counter::controller::{ControllerSettings, DashboardController};
use people_counter::http::{create_router, AppState};
use people_counter::source::HttpEventSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library are forwarded too.
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting people counter server");

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    info!(
        "Timezone {}, counters in={} out={}, {} festival editions",
        config.display.timezone,
        config.devices.inside,
        config.devices.outside,
        config.festival.editions().count()
    );

    let source = HttpEventSource::new(config.upstream.endpoint.clone(), config.request_timeout())
        .context("Failed to create upstream client")?;
    let settings = ControllerSettings::from_config(&config)?;
    let controller = Arc::new(DashboardController::new(Arc::new(source), settings));
    let tasks = Arc::clone(&controller).spawn();

    let app = create_router(AppState::new(controller));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down");
    tasks.shutdown().await;
    Ok(())
}
