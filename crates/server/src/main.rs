use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyfleet_core::{
    load_config, validate_config, BranchStore, Config, DeliveryBroadcaster, DispatchCoordinator,
    FleetStore, FlightSimulator, HttpOrderStatusClient, MemoryBranchStore, MemoryFleet,
    OrderStatusClient,
};

use skyfleet_server::api::create_router;
use skyfleet_server::metrics;
use skyfleet_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resolve_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Order service: {}", config.order_service.url);
    info!(
        "Simulator tick: {}ms, step: {}",
        config.simulator.tick_interval_ms, config.simulator.progress_step
    );

    metrics::register_metrics(&metrics::REGISTRY);

    let fleet: Arc<dyn FleetStore> = Arc::new(MemoryFleet::new(config.fleet.clone()));
    let branches: Arc<dyn BranchStore> = Arc::new(MemoryBranchStore::new());
    let broadcaster = Arc::new(DeliveryBroadcaster::new());
    let orders: Arc<dyn OrderStatusClient> = Arc::new(
        HttpOrderStatusClient::new(&config.order_service)
            .context("Failed to create order service client")?,
    );

    let simulator = FlightSimulator::new(
        config.simulator.clone(),
        Arc::clone(&fleet),
        Arc::clone(&broadcaster),
        Arc::clone(&orders),
    );
    let coordinator = Arc::new(DispatchCoordinator::new(
        Arc::clone(&fleet),
        Arc::clone(&broadcaster),
        Arc::clone(&orders),
        simulator,
    ));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = AppState::new(config, fleet, branches, broadcaster, coordinator);
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // In-flight trip tasks are owned by the runtime and stop with it.
    info!("Server shutting down...");

    Ok(())
}

/// Load configuration from `SKYFLEET_CONFIG` if set, else `config.toml` if
/// present, else built-in defaults.
fn resolve_config() -> Result<Config> {
    if let Ok(path) = std::env::var("SKYFLEET_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = PathBuf::from("config.toml");
    if default_path.exists() {
        info!("Loading configuration from {:?}", default_path);
        return load_config(&default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path));
    }

    info!("No config file found, using defaults");
    Ok(Config::default())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
