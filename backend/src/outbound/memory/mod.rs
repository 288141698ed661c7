//! In-memory repository adapters.
//!
//! Used when no database URL is configured and by HTTP and behaviour tests.
//! Each repository guards its records with a `Mutex` and enforces the same
//! uniqueness rules as the PostgreSQL schema. A poisoned lock is reported as
//! a query error.

mod course_repository;
mod result_repository;
mod user_repository;

pub use course_repository::MemoryCourseRepository;
pub use result_repository::MemoryResultRepository;
pub use user_repository::MemoryUserRepository;

fn poisoned<E>(query: impl FnOnce(String) -> E) -> E {
    query("in-memory store lock poisoned".to_owned())
}
