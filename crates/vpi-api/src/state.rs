//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Everything inside is immutable after construction
//! or internally synchronized, so cloning the state per request is cheap and
//! needs no locking.
//!
//! Argon2 is CPU-bound and deliberately slow. [`AppState::hash_password`] and
//! [`AppState::verify_password`] run it on the blocking pool so request
//! workers stay responsive.

use std::sync::Arc;

use vpi_core::{ServiceConfig, User};
use vpi_crypto::{CredentialError, CredentialManager, TokenService};
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::store::UserStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User persistence.
    pub users: Arc<dyn UserStore>,
    /// Password hashing and verification.
    pub credentials: Arc<CredentialManager>,
    /// Access token issuance and validation.
    pub tokens: Arc<TokenService>,
    /// Configuration the service was started with.
    pub config: Arc<ServiceConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("credentials", &self.credentials)
            .field("tokens", &self.tokens)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the credential manager and token service from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidCost`] if the configured Argon2
    /// parameters are rejected.
    pub fn new(config: ServiceConfig, users: Arc<dyn UserStore>) -> Result<Self, CredentialError> {
        let credentials = CredentialManager::new(&config.hash_cost)?;
        let tokens = TokenService::from_config(&config);
        Ok(Self {
            users,
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        })
    }

    /// Hash a password on the blocking pool.
    pub async fn hash_password(&self, password: Zeroizing<String>) -> Result<String, AppError> {
        let credentials = Arc::clone(&self.credentials);
        let hash = tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;
        Ok(hash)
    }

    /// Verify a login attempt on the blocking pool.
    ///
    /// With no user the password is checked against the decoy hash, so an
    /// unknown email costs as much as a wrong password. Returns the user only
    /// when the password matches.
    pub async fn verify_password(
        &self,
        password: Zeroizing<String>,
        user: Option<User>,
    ) -> Result<Option<User>, AppError> {
        let credentials = Arc::clone(&self.credentials);
        tokio::task::spawn_blocking(move || match user {
            Some(user) if credentials.verify(&password, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                credentials.verify_decoy(&password);
                None
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
    }
}
