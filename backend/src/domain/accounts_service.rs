//! Account domain service.
//!
//! Implements [`UserAccounts`] over the user repository and password hasher.
//! Deleting an account also removes the student's results and drops them
//! from every course roster, so no result outlives its student.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    CourseRepository, PasswordHasher, ProfileUpdate, ResultRepository, UserAccounts,
    UserRepository,
};
use crate::domain::{Error, LoginCredentials, PlainPassword, User, UserDraft, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the [`UserAccounts`] driving port.
#[derive(Clone)]
pub struct AccountService<U, C, R, H> {
    users: Arc<U>,
    courses: Arc<C>,
    results: Arc<R>,
    hasher: Arc<H>,
}

impl<U, C, R, H> AccountService<U, C, R, H> {
    pub fn new(users: Arc<U>, courses: Arc<C>, results: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            users,
            courses,
            results,
            hasher,
        }
    }
}

impl<U, C, R, H> AccountService<U, C, R, H>
where
    U: UserRepository,
    C: CourseRepository,
    R: ResultRepository,
    H: PasswordHasher,
{
    async fn require_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<U, C, R, H> UserAccounts for AccountService<U, C, R, H>
where
    U: UserRepository,
    C: CourseRepository,
    R: ResultRepository,
    H: PasswordHasher,
{
    async fn register(&self, draft: UserDraft, password: PlainPassword) -> Result<User, Error> {
        if self.users.find_by_email(&draft.email).await?.is_some() {
            return Err(Error::conflict("a user with this email already exists"));
        }
        let stored = self.hasher.hash(&password)?;
        let user = User::from_draft(UserId::random(), draft);
        self.users.insert(&user, &stored).await?;
        info!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some((user, stored)) = self.users.find_credentials(credentials.email()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self.hasher.verify(credentials.password(), &stored) {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<User, Error> {
        self.require_user(id).await
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self.users.list().await?)
    }

    async fn update(&self, id: UserId, update: ProfileUpdate) -> Result<User, Error> {
        let ProfileUpdate { changes, password } = update;
        let user = self.require_user(id).await?.apply(changes);
        self.users.update(&user).await?;
        if let Some(password) = password {
            let stored = self.hasher.hash(&password)?;
            self.users.set_password(id, &stored).await?;
        }
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> Result<(), Error> {
        self.require_user(id).await?;
        let removed_results = self.results.delete_for_student(id).await?;
        self.courses.remove_student(id).await?;
        if !self.users.delete(id).await? {
            return Err(Error::not_found(format!("user {id} not found")));
        }
        info!(user_id = %id, removed_results, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
