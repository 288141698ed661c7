//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CourseCatalogue, CourseRepository, PasswordHasher, ResultLedger, ResultRepository,
    UserAccounts, UserRepository,
};
use crate::domain::{AccountService, CatalogueService, LedgerService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
    pub catalogue: Arc<dyn CourseCatalogue>,
    pub ledger: Arc<dyn ResultLedger>,
}

/// The three repositories every service is built from.
pub struct Repositories<U, C, R> {
    pub users: Arc<U>,
    pub courses: Arc<C>,
    pub results: Arc<R>,
}

impl HttpState {
    pub fn new(
        accounts: Arc<dyn UserAccounts>,
        catalogue: Arc<dyn CourseCatalogue>,
        ledger: Arc<dyn ResultLedger>,
    ) -> Self {
        Self {
            accounts,
            catalogue,
            ledger,
        }
    }

    /// Wire the domain services over one set of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use portal::inbound::http::state::{HttpState, Repositories};
    /// use portal::outbound::memory::{
    ///     MemoryCourseRepository, MemoryResultRepository, MemoryUserRepository,
    /// };
    /// use portal::outbound::security::Argon2PasswordHasher;
    ///
    /// let state = HttpState::from_repositories(
    ///     Repositories {
    ///         users: Arc::new(MemoryUserRepository::new()),
    ///         courses: Arc::new(MemoryCourseRepository::new()),
    ///         results: Arc::new(MemoryResultRepository::new()),
    ///     },
    ///     Arc::new(Argon2PasswordHasher::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn from_repositories<U, C, R, H>(
        repositories: Repositories<U, C, R>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        U: UserRepository + 'static,
        C: CourseRepository + 'static,
        R: ResultRepository + 'static,
        H: PasswordHasher + 'static,
    {
        let Repositories {
            users,
            courses,
            results,
        } = repositories;
        Self {
            accounts: Arc::new(AccountService::new(
                users.clone(),
                courses.clone(),
                results.clone(),
                hasher,
            )),
            catalogue: Arc::new(CatalogueService::new(
                courses.clone(),
                users.clone(),
                results.clone(),
            )),
            ledger: Arc::new(LedgerService::new(results, users, courses, clock)),
        }
    }
}
