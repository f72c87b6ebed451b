use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use nestiq::config::AppConfig;
use nestiq::db::{self, SqliteStore};
use nestiq::routes::create_router;
use nestiq::services::booking::BookingService;
use nestiq::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.jwt_secret == "supersecretkey" && !config.is_development() {
        tracing::warn!("JWT_SECRET is unset; using the built-in development secret");
    }

    let conn = db::init_db(
        &config.database_url,
        Duration::from_millis(config.db_busy_timeout_ms),
    )?;
    tracing::info!(database = %config.database_url, "database ready");

    let store = Arc::new(SqliteStore::new(conn));
    let state = Arc::new(AppState {
        config: config.clone(),
        bookings: BookingService::new(store),
    });

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(env = %config.app_env, "starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::warn!("shutdown signal received");
}
