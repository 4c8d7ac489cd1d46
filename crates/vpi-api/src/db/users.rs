//! User persistence on the `users` table.
//!
//! Each operation checks a connection out of the pool for its own duration.
//! The `PoolConnection` returns itself to the pool when dropped, including on
//! early `?` returns, so no path can leak a connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vpi_core::{Email, NewUser, User, UserId};

use crate::store::{StoreError, UserStore};

/// [`UserStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wrap an initialized pool. See [`crate::db::init_pool`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = new_user.into_user(Utc::now());
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;

        sqlx::query(
            "INSERT INTO users (id, email, full_name, hashed_password, is_active, is_superuser, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => unavailable(e),
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, full_name, hashed_password, is_active, is_superuser, created_at
             FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(unavailable)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    hashed_password: String,
    is_active: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let email = Email::new(&self.email).map_err(|e| {
            tracing::error!(id = %self.id, error = %e, "stored email failed validation");
            StoreError::InvalidRecord(format!("user {}: {e}", self.id))
        })?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            email,
            full_name: self.full_name,
            password_hash: self.hashed_password,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
            created_at: self.created_at,
        })
    }
}
