//! Driving port for course administration and registration.

use async_trait::async_trait;

use crate::domain::{Course, CourseChanges, CourseDetail, CourseDraft, CourseId, Error, UserId};

/// Domain use-case port for the course catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCatalogue: Send + Sync {
    async fn create(&self, draft: CourseDraft) -> Result<Course, Error>;

    async fn list(&self) -> Result<Vec<Course>, Error>;

    /// Fetch a course with its registered students resolved.
    async fn get(&self, id: CourseId) -> Result<CourseDetail, Error>;

    async fn update(&self, id: CourseId, changes: CourseChanges) -> Result<Course, Error>;

    /// Remove a course together with every result recorded against it.
    async fn delete(&self, id: CourseId) -> Result<(), Error>;

    async fn register(&self, id: CourseId, student: UserId) -> Result<Course, Error>;

    async fn unregister(&self, id: CourseId, student: UserId) -> Result<Course, Error>;
}
