//! Port abstraction for course persistence, including registrations.

use async_trait::async_trait;

use crate::domain::{Course, CourseId, Error, RegistrationError, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// Another course already uses the code or name.
        Duplicate { message: String } => "course already exists: {message}",
        /// The student already holds a registration for the course.
        AlreadyRegistered => "student already registered for course",
        /// The student holds no registration for the course.
        NotRegistered => "student not registered for course",
        /// The course disappeared before the roster change was applied.
        CourseMissing => "course not found",
    }
}

impl From<CourseRepositoryError> for Error {
    fn from(error: CourseRepositoryError) -> Self {
        match error {
            CourseRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("course repository unavailable: {message}"))
            }
            CourseRepositoryError::Query { message } => {
                Error::internal(format!("course repository error: {message}"))
            }
            CourseRepositoryError::Duplicate { .. } => {
                Error::conflict("a course with this code or name already exists")
            }
            CourseRepositoryError::AlreadyRegistered => {
                Error::invalid_request(RegistrationError::AlreadyRegistered.to_string())
            }
            CourseRepositoryError::NotRegistered => {
                Error::invalid_request(RegistrationError::NotRegistered.to_string())
            }
            CourseRepositoryError::CourseMissing => Error::not_found("course not found"),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Overwrite a course's code, name and credits. The roster is untouched.
    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Append one student to a course roster.
    ///
    /// Fails with `AlreadyRegistered` when the pair exists and with
    /// `CourseMissing` when the course does not.
    async fn add_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError>;

    /// Remove one student from a course roster.
    ///
    /// Fails with `NotRegistered` when the pair does not exist.
    async fn remove_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError>;

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    /// Fetch several courses at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError>;

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Remove a course and its registrations. Returns `false` when absent.
    async fn delete(&self, id: CourseId) -> Result<bool, CourseRepositoryError>;

    /// Drop a student from every course they are registered for.
    async fn remove_student(&self, student: UserId) -> Result<(), CourseRepositoryError>;
}
