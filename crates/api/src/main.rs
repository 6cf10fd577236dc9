use anyhow::{Context, Result};
use domain::models::default_groups;
use persistence::repositories::BadgeGroupRepository;
use std::net::SocketAddr;
use tracing::info;

use trust_badges_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Trust Badges API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let seeded = BadgeGroupRepository::new(pool.clone())
        .ensure_defaults(&default_groups())
        .await
        .context("Failed to seed default badge groups")?;
    if seeded > 0 {
        info!(count = seeded, "Seeded default badge groups");
    }

    let addr = config.socket_addr();
    let app = app::create_app(config, pool)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
