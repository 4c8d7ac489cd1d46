//! # vpi-api — Binary Entry Point
//!
//! Loads configuration from the environment, connects to Postgres and serves
//! the auth API on `0.0.0.0:$PORT` (default 8000).
//!
//! Set `LOG_FORMAT=json` for JSON log lines; `RUST_LOG` controls filtering.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vpi_api::db::users::PgUserStore;
use vpi_api::AppState;
use vpi_core::ServiceConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ServiceConfig::from_env().map_err(|e| {
        tracing::error!("Configuration invalid: {e}");
        e
    })?;
    tracing::info!(
        algorithm = %config.token_algorithm,
        token_ttl_minutes = config.access_token_ttl.num_minutes(),
        hash_memory_kib = config.hash_cost.memory_kib,
        "Configuration loaded"
    );

    let pool = vpi_api::db::init_pool(&config).await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::new(config, Arc::new(PgUserStore::new(pool))).map_err(|e| {
        tracing::error!("Credential manager initialization failed: {e}");
        e
    })?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = vpi_api::app(state);

    tracing::info!("VPI auth service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
