//! Port abstraction for course result persistence.
//!
//! Adapters must enforce uniqueness of (student, course) and report a
//! violation as [`ResultRepositoryError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CourseId, CourseResult, Error, ResultId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by result repository adapters.
    pub enum ResultRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "result repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "result repository query failed: {message}",
        /// A result already exists for the student and course.
        Duplicate { message: String } => "result already exists: {message}",
    }
}

impl From<ResultRepositoryError> for Error {
    fn from(error: ResultRepositoryError) -> Self {
        match error {
            ResultRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("result repository unavailable: {message}"))
            }
            ResultRepositoryError::Query { message } => {
                Error::internal(format!("result repository error: {message}"))
            }
            ResultRepositoryError::Duplicate { .. } => {
                Error::conflict("result already exists for this student and course")
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn insert(&self, result: &CourseResult) -> Result<(), ResultRepositoryError>;

    /// Overwrite score, grade, and date of an existing result.
    async fn update(&self, result: &CourseResult) -> Result<(), ResultRepositoryError>;

    async fn find_by_id(&self, id: ResultId) -> Result<Option<CourseResult>, ResultRepositoryError>;

    async fn find_for_student_and_course(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Option<CourseResult>, ResultRepositoryError>;

    async fn list_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError>;

    /// Results for a course ordered by student id.
    async fn list_for_course(
        &self,
        course: CourseId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError>;

    /// Every result, newest `date_achieved` first.
    async fn list_all(&self) -> Result<Vec<CourseResult>, ResultRepositoryError>;

    /// Returns `false` when the result did not exist.
    async fn delete(&self, id: ResultId) -> Result<bool, ResultRepositoryError>;

    /// Returns the number of results removed.
    async fn delete_for_student(&self, student: UserId) -> Result<usize, ResultRepositoryError>;

    /// Returns the number of results removed.
    async fn delete_for_course(&self, course: CourseId) -> Result<usize, ResultRepositoryError>;

    /// Stamp `now` onto results that have no achievement date.
    /// Returns the number of results changed.
    async fn backfill_missing_dates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, ResultRepositoryError>;
}
