//! In-memory `UserRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserCredentialRecord, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, StoredPassword, User, UserId};

use super::poisoned;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: StoredPassword,
}

/// Users kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> Result<MutexGuard<'_, Vec<Account>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| poisoned(UserPersistenceError::query))
    }
}

fn email_taken(accounts: &[Account], email: &EmailAddress, except: Option<UserId>) -> bool {
    accounts
        .iter()
        .any(|account| account.user.email() == email && Some(account.user.id()) != except)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.accounts()?;
        if email_taken(&accounts, user.email(), None) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        accounts.push(Account {
            user: user.clone(),
            password: password.clone(),
        });
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut accounts = self.accounts()?;
        if email_taken(&accounts, user.email(), Some(user.id())) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        let account = accounts
            .iter_mut()
            .find(|account| account.user.id() == user.id())
            .ok_or_else(|| UserPersistenceError::query("user not found for update"))?;
        account.user = user.clone();
        Ok(())
    }

    async fn set_password(
        &self,
        id: UserId,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.accounts()?;
        if let Some(account) = accounts.iter_mut().find(|account| account.user.id() == id) {
            account.password = password.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .filter(|account| ids.contains(&account.user.id()))
            .map(|account| account.user.clone())
            .collect())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .find(|account| account.user.email() == email)
            .map(|account| account.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, StoredPassword)>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .find(|account| account.user.email() == email)
            .map(|account| (account.user.clone(), account.password.clone())))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .map(|account| account.user.clone())
            .collect())
    }

    async fn list_credentials(&self) -> Result<Vec<UserCredentialRecord>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .iter()
            .map(|account| UserCredentialRecord {
                id: account.user.id(),
                password: account.password.clone(),
            })
            .collect())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut accounts = self.accounts()?;
        let before = accounts.len();
        accounts.retain(|account| account.user.id() != id);
        Ok(accounts.len() < before)
    }
}
