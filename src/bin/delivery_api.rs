//! Delivery Estimator API Server
//!
//! REST API for delivery estimates, restaurants and orders.
//!
//! Usage:
//!   cargo run --bin delivery_api
//!
//! Environment:
//!   PORT / DELIVERY_PORT - Server port (default: 8080)
//!   DELIVERY_HOST        - Server host (default: 0.0.0.0)
//!   GEOCODER_URL         - Nominatim-compatible search endpoint
//!   RUST_LOG             - Log level (default: info)

use delivery_estimator::api::{create_router, start_cleanup_task, AppState};
use delivery_estimator::utils::constants::{APP_NAME, APP_VERSION};
use delivery_estimator::{AppConfig, DeliveryEstimator, MemoryStore, NominatimGeocoder, TelemetryCollector};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    config.log_summary();

    let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
    let estimator = DeliveryEstimator::new(geocoder, config.pricing)
        .with_lookup_timeout(config.geocoder.timeout);

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(
        estimator,
        Arc::new(MemoryStore::new()),
        telemetry,
        config.rate_limit,
    ));

    start_cleanup_task(state.rate_limiter.clone());
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("{} v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST  /v1/delivery/estimate         - Delivery fee and ETA");
    info!("  POST  /v1/delivery/estimate/batch   - Several estimates at once");
    info!("  POST  /v1/restaurants               - Register a restaurant");
    info!("  POST  /v1/restaurants/:id/orders    - Create a priced order");
    info!("  PATCH /v1/orders/:id/status         - Advance an order");
    info!("  GET   /v1/stats                     - Estimate statistics");
    info!("  GET   /v1/health                    - Health check");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, cleaning up...");

    let stats = telemetry_for_shutdown.get_stats();
    info!(
        estimates_ok = stats.estimates_ok,
        estimates_failed = stats.estimates_failed,
        orders_created = stats.orders_created,
        orders_rejected = stats.orders_rejected,
        "Final statistics"
    );

    match telemetry_for_shutdown.export_stats_json(Path::new("./telemetry")) {
        Ok(path) => info!("Stats exported to: {}", path.display()),
        Err(e) => warn!("Failed to export stats: {}", e),
    }

    info!("{} shutdown complete", APP_NAME);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
