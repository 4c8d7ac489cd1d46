//! # User Store
//!
//! The [`UserStore`] trait is the only persistence seam the request layer
//! sees. Handlers hold it as `Arc<dyn UserStore>` inside [`AppState`].
//!
//! - [`crate::db::users::PgUserStore`] is the production implementation.
//! - [`InMemoryUserStore`] backs the test suite and local experiments.
//!
//! Duplicate detection happens inside `insert` as a single atomic step. There
//! is no separate "does this email exist?" query for callers to race against.
//!
//! [`AppState`]: crate::state::AppState

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;
use vpi_core::{AuthError, Email, NewUser, User};

/// Failure reported by a [`UserStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A user with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// The backing store could not be reached or the query failed.
    #[error("user store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be turned back into a [`User`].
    #[error("invalid user record: {0}")]
    InvalidRecord(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Unavailable(detail) | StoreError::InvalidRecord(detail) => {
                AuthError::StoreUnavailable(detail)
            }
        }
    }
}

/// Persistent user records keyed by normalized email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, assigning its id and creation time.
    ///
    /// Returns [`StoreError::DuplicateEmail`] without modifying the existing
    /// record when the email is taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Look a user up by email. `Ok(None)` when no such user exists.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Check connectivity without side effects.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-process user store.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Email, User>>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Remove a user, returning the removed record.
    ///
    /// The service never deletes users itself; this stands in for an
    /// operator removing an account out of band.
    pub fn remove(&self, email: &Email) -> Option<User> {
        self.users.write().remove(email)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write();
        match users.entry(new_user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                let user = new_user.into_user(Utc::now());
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().get(email).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            email: Email::new(email).unwrap(),
            full_name: name.to_string(),
            password_hash: "$argon2id$v=19$m=64,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("gail@example.com", "Gail")).await.unwrap();
        let found = store
            .find_by_email(&Email::new("gail@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, user);
        assert!(found.is_active);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_is_rejected_and_original_kept() {
        let store = InMemoryUserStore::new();
        let first = store.insert(new_user("hal@example.com", "Hal")).await.unwrap();
        let err = store
            .insert(new_user("HAL@example.com", "Impostor"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);

        let kept = store.find_by_email(&first.email).await.unwrap().unwrap();
        assert_eq!(kept.full_name, "Hal");
        assert_eq!(kept.id, first.id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let store = InMemoryUserStore::new();
        let found = store
            .find_by_email(&Email::new("nobody@example.com").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_makes_user_unresolvable() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("ivy@example.com", "Ivy")).await.unwrap();
        assert!(store.remove(&user.email).is_some());
        assert!(store.find_by_email(&user.email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ping_succeeds() {
        assert!(InMemoryUserStore::new().ping().await.is_ok());
    }

    #[test]
    fn store_errors_map_into_auth_taxonomy() {
        assert_eq!(
            AuthError::from(StoreError::DuplicateEmail),
            AuthError::DuplicateEmail
        );
        assert!(matches!(
            AuthError::from(StoreError::Unavailable("down".into())),
            AuthError::StoreUnavailable(_)
        ));
    }
}
