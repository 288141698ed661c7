//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) describe what the domain
//! needs from infrastructure. Driving ports ([`UserAccounts`],
//! [`CourseCatalogue`], [`ResultLedger`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod course_catalogue;
mod course_repository;
mod password_hasher;
mod result_ledger;
mod result_repository;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use course_catalogue::MockCourseCatalogue;
pub use course_catalogue::CourseCatalogue;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use result_ledger::MockResultLedger;
pub use result_ledger::ResultLedger;
#[cfg(test)]
pub use result_repository::MockResultRepository;
pub use result_repository::{ResultRepository, ResultRepositoryError};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{ProfileUpdate, UserAccounts};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentialRecord, UserPersistenceError, UserRepository};
