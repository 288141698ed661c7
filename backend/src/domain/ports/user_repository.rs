//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, StoredPassword, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "a user with email {email} already exists",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => {
                Error::conflict("a user with this email already exists")
            }
        }
    }
}

/// Stored credentials for one account, as read by maintenance tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentialRecord {
    pub id: UserId,
    pub password: StoredPassword,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account with its password hash.
    async fn insert(
        &self,
        user: &User,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError>;

    /// Overwrite an existing account's profile fields.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace an account's stored password.
    async fn set_password(
        &self,
        id: UserId,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch several users at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account together with its stored password for login.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, StoredPassword)>, UserPersistenceError>;

    /// All accounts in creation order.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Stored passwords for every account.
    async fn list_credentials(&self) -> Result<Vec<UserCredentialRecord>, UserPersistenceError>;

    /// Remove an account. Returns `false` when it did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
