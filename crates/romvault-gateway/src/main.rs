//! romvault gateway binary.

use clap::Parser;
use romvault_core::SaveService;
use romvault_gateway::{create_router, AppState, Args, GatewayConfig, Pages, RomLibrary};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line args
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "romvault_gateway={level},romvault_core={level},tower_http=info",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from(&args);
    if config.database_url.trim().is_empty() {
        anyhow::bail!("DATABASE_URL is required");
    }
    if config.pool_max_connections == 0 {
        anyhow::bail!("pool_max_connections must be at least 1");
    }
    if config.pool_min_connections > config.pool_max_connections {
        anyhow::bail!("pool_min_connections cannot exceed pool_max_connections");
    }

    info!(
        listen = %config.listen_addr,
        roms_dir = %config.roms_dir.display(),
        "Starting romvault gateway"
    );

    // Connect and provision the schema before serving anything
    let store = romvault_core::connect(&config.store_config()).await?;
    store.ensure_schema().await?;
    info!(
        backend = store.backend(),
        max_connections = config.pool_max_connections,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        slot_policy = ?config.slot_policy,
        "Save store ready"
    );

    let saves = SaveService::new(store)
        .with_deadline(config.request_timeout)
        .with_slot_policy(config.slot_policy);
    let roms = RomLibrary::new(&config.roms_dir);
    let pages = Pages::load()?;

    // Create application state
    let state = AppState::new(saves, roms, pages, config.clone());

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
