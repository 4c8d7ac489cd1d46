//! # Error Hierarchy
//!
//! Structured error types for the auth service, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`AuthError`] is the outcome taxonomy shared by the credential manager,
//! the token service and the user store. The HTTP layer collapses the token
//! variants into a single unauthorized response; the distinction survives
//! here for logging and tests.

use thiserror::Error;

/// Outcome of a failed registration, login or token resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The email is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. Does not say which.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// The token signature does not match the service secret.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token could not be parsed.
    #[error("token is malformed")]
    Malformed,

    /// The token expiry is not in the future.
    #[error("token has expired")]
    Expired,

    /// The token payload carries no subject.
    #[error("token has no subject")]
    MissingSubject,

    /// The user store could not be reached.
    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Whether this error came from validating a bearer token.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::Malformed | Self::Expired | Self::MissingSubject
        )
    }
}

/// Domain primitive validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a syntactically valid email address.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Full name is empty or too long.
    #[error("full_name must be between 1 and {max} characters")]
    InvalidFullName {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// Password length is out of bounds.
    #[error("password must be between {min} and {max} bytes")]
    InvalidPassword {
        /// Minimum accepted length in bytes.
        min: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },
}

/// Startup configuration failure. The process must not start serving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// An environment variable is set but cannot be used.
    #[error("{var} is invalid: {reason}")]
    Invalid {
        /// The offending variable.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The signing secret is shorter than the accepted minimum.
    #[error("JWT_SECRET_KEY must be at least {min} bytes, got {actual}")]
    WeakSecret {
        /// Minimum secret length in bytes.
        min: usize,
        /// Length of the provided secret.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_are_classified() {
        assert!(AuthError::InvalidSignature.is_token_error());
        assert!(AuthError::Malformed.is_token_error());
        assert!(AuthError::Expired.is_token_error());
        assert!(AuthError::MissingSubject.is_token_error());
        assert!(!AuthError::InvalidCredentials.is_token_error());
        assert!(!AuthError::DuplicateEmail.is_token_error());
        assert!(!AuthError::StoreUnavailable("down".into()).is_token_error());
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        let msg = AuthError::InvalidCredentials.to_string();
        assert_eq!(msg, "incorrect email or password");
    }

    #[test]
    fn config_error_names_the_variable() {
        let err = ConfigError::Missing("JWT_SECRET_KEY");
        assert!(err.to_string().contains("JWT_SECRET_KEY"));

        let err = ConfigError::Invalid {
            var: "PORT",
            reason: "not a number".into(),
        };
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("not a number"));
    }
}
