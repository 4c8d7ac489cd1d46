#![deny(missing_docs)]

//! # vpi-core — Foundational Types for the VPI Auth Service
//!
//! Every other crate in the workspace depends on this one. It performs no
//! I/O except reading environment variables during [`ServiceConfig::from_env`].
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** An [`Email`] is validated and
//!    normalized at construction; a [`UserId`] is always valid.
//!
//! 2. **The password hash never leaves the record.** [`User`] redacts it in
//!    `Debug` and does not implement `Serialize`.
//!
//! 3. **One error taxonomy.** [`AuthError`] names every credential, token and
//!    store outcome. Lower-level errors convert into it with `From`.
//!
//! 4. **Configuration is a value, not a global.** [`ServiceConfig`] is built
//!    once at startup and handed to whoever needs it.

pub mod config;
pub mod error;
pub mod identity;
pub mod user;

pub use config::{HashCost, ServiceConfig, SigningSecret, TokenAlgorithm};
pub use error::{AuthError, ConfigError, ValidationError};
pub use identity::{Email, UserId};
pub use user::{
    validate_full_name, validate_password, NewUser, User, MAX_FULL_NAME_CHARS, MAX_PASSWORD_BYTES,
    MIN_PASSWORD_BYTES,
};
