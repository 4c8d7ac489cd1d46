//! # vpi-crypto — Credential and Token Primitives
//!
//! Two stateless components, both safe to share across threads behind an
//! `Arc` without locking:
//!
//! - [`CredentialManager`] hashes passwords at registration and verifies
//!   them at login (Argon2id, PHC string format).
//! - [`TokenService`] issues HMAC-signed, time-limited access tokens (JWT)
//!   and resolves them back to their subject.
//!
//! Neither component performs I/O. Both are built once from
//! [`vpi_core::ServiceConfig`] at startup.

pub mod error;
pub mod password;
pub mod token;

pub use error::{CredentialError, SigningError};
pub use password::CredentialManager;
pub use token::TokenService;
