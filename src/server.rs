//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, background task spawning, and the
//! Axum server lifecycle.

use crate::config::{CacheBackend, Config};
use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::PgUrlRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::clock::SystemClock;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long shutdown waits for buffered clicks to reach the store.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache backend (Redis, in-process, or NullCache fallback)
/// - Background click worker
/// - Expiration sweeper
/// - Axum HTTP server with graceful shutdown on SIGINT/SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let cache = connect_cache(&config).await;

    let repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(Arc::new(pool)));

    let (click_tx, click_rx) = mpsc::channel::<ClickEvent>(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        "Click worker started ({} concurrent updates)",
        config.click_worker_concurrency
    );

    let state = AppState::new(
        repository,
        cache,
        Arc::new(SystemClock),
        click_tx,
        config.service_settings(),
    );

    let sweeper = state
        .cleanup_service
        .clone()
        .spawn(Duration::from_secs(config.cleanup_interval_secs));

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal(sweeper))
    .await?;

    // The router held the last click senders; the worker now drains and exits.
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker).await {
        Ok(_) => tracing::info!("Click queue drained"),
        Err(_) => tracing::warn!("Click queue not drained within {:?}", CLICK_DRAIN_TIMEOUT),
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Creates the PostgreSQL pool using the configured pool settings.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Builds the configured cache backend.
///
/// An unreachable Redis is not fatal: the service starts with [`NullCache`]
/// and serves every read from the store.
pub async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (in-process)");
            Arc::new(MemoryCache::new(config.cache_ttl_seconds))
        }
        _ => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Resolves on SIGINT or SIGTERM and stops the expiration sweeper.
async fn shutdown_signal(sweeper: JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    sweeper.abort();
    tracing::info!("Expiration sweeper stopped");
}
