//! Driving port for account use-cases.
//!
//! Inbound adapters call this port to register, authenticate, and manage
//! users without importing persistence or hashing concerns.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, PlainPassword, ProfileChanges, User, UserDraft, UserId};

/// A profile update, optionally replacing the password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub changes: ProfileChanges,
    pub password: Option<PlainPassword>,
}

/// Domain use-case port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Create an account. Fails with `conflict` when the email is taken.
    async fn register(&self, draft: UserDraft, password: PlainPassword) -> Result<User, Error>;

    /// Verify credentials. Any mismatch yields `unauthorized`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    async fn get(&self, id: UserId) -> Result<User, Error>;

    async fn list(&self) -> Result<Vec<User>, Error>;

    async fn update(&self, id: UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Remove an account together with its results and registrations.
    async fn delete(&self, id: UserId) -> Result<(), Error>;
}
