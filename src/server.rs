//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, background tasks and the Axum server lifecycle.

use crate::application::event_worker::{
    EventTracker, RETENTION_PERIOD, run_event_worker, spawn_retention_task,
};
use crate::application::services::{AnalyticsService, AuthService};
use crate::config::Config;
use crate::domain::repositories::{EventRepository, LinkRepository, TokenRepository};
use crate::infrastructure::persistence::{PgEventRepository, PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Creates the PostgreSQL pool from the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Background event worker
/// - Retention purge (when enabled)
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let events: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(pool.clone()));
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let tokens: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool));

    let analytics_service = Arc::new(AnalyticsService::new(events, links));
    let auth_service = Arc::new(AuthService::new(
        tokens,
        config.token_signing_secret.clone(),
    ));

    let (event_tracker, event_rx) = EventTracker::channel(config.event_queue_capacity);
    tokio::spawn(run_event_worker(event_rx, analytics_service.clone()));

    if config.is_retention_enabled() {
        spawn_retention_task(
            analytics_service.clone(),
            config.event_retention_days,
            RETENTION_PERIOD,
        );
        tracing::info!(
            retention_days = config.event_retention_days,
            "Retention task started"
        );
    }

    let state = AppState::new(
        analytics_service,
        auth_service,
        event_tracker,
        config.behind_proxy,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
