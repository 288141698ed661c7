//! Build the HTTP state over Diesel or in-memory repositories.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use portal::inbound::http::state::{HttpState, Repositories};
use portal::outbound::memory::{
    MemoryCourseRepository, MemoryResultRepository, MemoryUserRepository,
};
use portal::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselResultRepository, DieselUserRepository,
};
use portal::outbound::security::Argon2PasswordHasher;

/// Wire services over PostgreSQL when a pool is configured.
///
/// Without a pool the server keeps everything in process memory, which is
/// only suitable for local development and demos.
pub fn build_http_state(db_pool: Option<&DbPool>) -> HttpState {
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let clock = Arc::new(DefaultClock);
    match db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            HttpState::from_repositories(
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    courses: Arc::new(DieselCourseRepository::new(pool.clone())),
                    results: Arc::new(DieselResultRepository::new(pool.clone())),
                },
                hasher,
                clock,
            )
        }
        None => {
            warn!("no database configured; data will not survive a restart");
            HttpState::from_repositories(
                Repositories {
                    users: Arc::new(MemoryUserRepository::new()),
                    courses: Arc::new(MemoryCourseRepository::new()),
                    results: Arc::new(MemoryResultRepository::new()),
                },
                hasher,
                clock,
            )
        }
    }
}
