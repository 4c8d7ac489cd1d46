//! # Database Persistence Layer
//!
//! Postgres persistence for user records via SQLx.
//!
//! The database is **required**: startup fails if `DATABASE_URL` cannot be
//! reached or migrations cannot be applied. Embedded migrations live in
//! `crates/vpi-api/migrations/` and run on every start.

pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};
use vpi_core::ServiceConfig;

/// Initialize the connection pool and run migrations.
///
/// # Errors
///
/// Returns the connection or migration error. Callers treat it as fatal.
pub async fn init_pool(config: &ServiceConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(config.database_url.as_str())
        .await?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "Connected to PostgreSQL"
    );

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
