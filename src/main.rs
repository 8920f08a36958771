//! PartyGate server
//!
//! Main application entry point

use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use PartyGate::{
    config::Settings,
    database::{connection::{create_pool, run_migrations, DatabaseConfig}, DatabaseService},
    handlers,
    middleware::rate_limit::spawn_cleanup,
    services::ServiceFactory,
    state::{AppContext, SessionStorage},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting PartyGate...");

    info!("Connecting to database...");
    let pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;

    info!("Running database migrations...");
    run_migrations(&pool).await?;

    info!("Connecting to Redis...");
    let sessions = Arc::new(SessionStorage::new(settings.redis.clone()).await?);

    let database = Arc::new(DatabaseService::new(pool));

    info!("Initializing services...");
    let services = Arc::new(ServiceFactory::new(&settings, database.clone(), sessions.clone())?);
    let cleanup = spawn_cleanup(services.access.rate_limiter().clone());

    let cors = CorsLayer::new()
        .allow_origin(
            settings
                .server
                .public_url
                .parse::<HeaderValue>()
                .context("server.public_url is not a valid origin")?,
        )
        .allow_methods(Any)
        .allow_headers(Any);

    let bind_address = settings.bind_address();
    let ctx = AppContext::new(settings, database, sessions, services);
    let app = handlers::router(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!(address = %bind_address, "PartyGate is ready");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    info!("PartyGate has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
