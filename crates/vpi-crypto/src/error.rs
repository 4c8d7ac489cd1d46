//! Errors raised while building hashers or producing signed artifacts.
//!
//! Token validation failures are not here: they use the shared
//! [`vpi_core::AuthError`] taxonomy directly.

use thiserror::Error;

/// Failure configuring or running the password hasher.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The configured Argon2 cost parameters are out of range.
    #[error("invalid password hash parameters: {0}")]
    InvalidCost(String),

    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Failure producing a signed token.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The subject is empty.
    #[error("token subject must not be empty")]
    EmptySubject,

    /// The JWT library refused to encode.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}
