//! # User Records
//!
//! [`User`] is the stored identity record. It is created on registration and
//! never mutated by the service. It does not implement `Serialize`; the
//! HTTP layer builds its own response view without the password hash.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::identity::{Email, UserId};

/// Maximum length of a full name, in characters.
pub const MAX_FULL_NAME_CHARS: usize = 255;
/// Minimum password length, in bytes.
pub const MIN_PASSWORD_BYTES: usize = 8;
/// Maximum password length, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// A registered user as held by the user store.
///
/// Custom `Debug` redacts the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Login subject, unique across users.
    pub email: Email,
    /// Display name.
    pub full_name: String,
    /// PHC-encoded password hash. Never the plaintext.
    pub password_hash: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account has superuser rights.
    pub is_superuser: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("is_superuser", &self.is_superuser)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Fields of a user about to be registered.
///
/// The store assigns the identifier and creation time; new users are active
/// and not superusers.
#[derive(Clone)]
pub struct NewUser {
    /// Login subject.
    pub email: Email,
    /// Display name, already validated.
    pub full_name: String,
    /// PHC-encoded password hash.
    pub password_hash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl NewUser {
    /// Materialize the stored record with a fresh identifier.
    pub fn into_user(self, created_at: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            email: self.email,
            full_name: self.full_name,
            password_hash: self.password_hash,
            is_active: true,
            is_superuser: false,
            created_at,
        }
    }
}

/// Trim and bound-check a full name.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidFullName`] when the trimmed name is
/// empty or longer than [`MAX_FULL_NAME_CHARS`].
pub fn validate_full_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_FULL_NAME_CHARS {
        return Err(ValidationError::InvalidFullName {
            max: MAX_FULL_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Bound-check a plaintext password before hashing.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPassword`] outside
/// `MIN_PASSWORD_BYTES..=MAX_PASSWORD_BYTES`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if (MIN_PASSWORD_BYTES..=MAX_PASSWORD_BYTES).contains(&password.len()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPassword {
            min: MIN_PASSWORD_BYTES,
            max: MAX_PASSWORD_BYTES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        NewUser {
            email: Email::new("erin@example.com").unwrap(),
            full_name: "Erin Example".into(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into(),
        }
        .into_user(Utc::now())
    }

    #[test]
    fn new_user_defaults_to_active_non_superuser() {
        let user = sample_user();
        assert!(user.is_active);
        assert!(!user.is_superuser);
    }

    #[test]
    fn debug_redacts_password_hash() {
        let user = sample_user();
        let rendered = format!("{user:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("argon2id"));
    }

    #[test]
    fn full_name_is_trimmed() {
        assert_eq!(validate_full_name("  Frank  ").unwrap(), "Frank");
    }

    #[test]
    fn full_name_bounds() {
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"x".repeat(MAX_FULL_NAME_CHARS)).is_ok());
        assert!(validate_full_name(&"x".repeat(MAX_FULL_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_BYTES)).is_ok());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
    }
}
