//! Port for one-way password hashing.

use crate::domain::{Error, PlainPassword, StoredPassword};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hashing backend failed to produce a hash.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Self {
        Error::internal(error.to_string())
    }
}

/// Hashes new passwords and verifies login attempts against stored ones.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &PlainPassword) -> Result<StoredPassword, PasswordHashError>;

    /// `true` when `password` matches `stored`. A stored value that is not a
    /// recognised hash never matches.
    fn verify(&self, password: &PlainPassword, stored: &StoredPassword) -> bool;

    /// `true` when `stored` is already a hash this adapter understands.
    fn is_hashed(&self, stored: &StoredPassword) -> bool;
}
