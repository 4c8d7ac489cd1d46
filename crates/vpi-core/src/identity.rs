//! # Identity Newtypes
//!
//! [`UserId`] is always valid by construction. [`Email`] validates and
//! normalizes at construction, so any `Email` value can be used as a store
//! key and as a token subject without further checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Unique identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A login email address.
///
/// # Validation
///
/// - Surrounding whitespace is trimmed; interior whitespace is rejected
/// - At most 254 bytes
/// - Exactly one `@` with a non-empty local part
/// - Domain has at least one `.` and no empty labels
///
/// The stored value is lowercased, making uniqueness and login
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

const MAX_EMAIL_LEN: usize = 254;

impl Email {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] if the value is not a
    /// plausible address.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.to_lowercase()))
        } else {
            Err(ValidationError::InvalidEmail(raw.to_string()))
        }
    }

    fn is_valid(s: &str) -> bool {
        if s.is_empty() || s.len() > MAX_EMAIL_LEN || s.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = s.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') || !domain.contains('.') {
            return false;
        }
        domain.split('.').all(|label| !label.is_empty())
    }

    /// Access the normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn user_id_roundtrips_uuid() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn email_accepts_plain_address() {
        let email = Email::new("alice@example.com").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = Email::new("  Alice.Smith@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice.smith@example.com");
    }

    #[test]
    fn email_equality_is_case_insensitive() {
        assert_eq!(
            Email::new("BOB@example.org").unwrap(),
            Email::new("bob@EXAMPLE.org").unwrap()
        );
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in [
            "",
            "   ",
            "no-at-sign",
            "@example.com",
            "alice@",
            "alice@localhost",
            "alice@@example.com",
            "alice@exa mple.com",
            "alice@example..com",
            "alice@.example.com",
            "alice@example.com.",
            "a@b@example.com",
        ] {
            assert!(Email::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn email_rejects_overlong_address() {
        let local = "a".repeat(250);
        assert!(Email::new(format!("{local}@example.com")).is_err());
    }

    #[test]
    fn email_deserialize_validates() {
        let ok: Email = serde_json::from_str("\"Carol@Example.com\"").unwrap();
        assert_eq!(ok.as_str(), "carol@example.com");

        let err = serde_json::from_str::<Email>("\"not-an-email\"");
        assert!(err.is_err());
    }

    #[test]
    fn email_serializes_as_plain_string() {
        let email = Email::new("dave@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"dave@example.com\"");
    }
}
