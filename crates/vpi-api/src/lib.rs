//! # vpi-api — Axum HTTP Service for VPI Authentication
//!
//! Registers users, issues bearer tokens on password login and resolves
//! bearer tokens back to the stored user.
//!
//! ## API Surface
//!
//! | Route             | Module                  | Auth   |
//! |-------------------|-------------------------|--------|
//! | `POST /register`  | [`routes::users`]       | none   |
//! | `POST /token`     | [`routes::token`]       | none   |
//! | `GET /users/me`   | [`routes::users`]       | bearer |
//! | `GET /health`     | [`routes::health`]      | none   |
//! | `GET /openapi.json` | [`openapi`]           | none   |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → Handler
//! ```
//!
//! Bearer authentication is an extractor ([`auth::CurrentUser`]) on the
//! routes that need it, not a layer.
//!
//! ## Crate Policy
//!
//! - Credential and token logic lives in `vpi-crypto`; handlers only call it.
//! - Persistence goes through the [`store::UserStore`] trait.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;

pub use error::AppError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::users::router())
        .merge(routes::token::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}
