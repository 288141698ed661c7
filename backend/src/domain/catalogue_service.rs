//! Course catalogue domain service.
//!
//! Implements [`CourseCatalogue`] over the course repository. Roster changes
//! go through the repository's single-row registration operations, so
//! concurrent registrations and course edits never overwrite each other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{CourseCatalogue, CourseRepository, ResultRepository, UserRepository};
use crate::domain::{
    Course, CourseChanges, CourseDetail, CourseDraft, CourseId, Error, StudentSummary, UserId,
};

/// Course catalogue service implementing the [`CourseCatalogue`] driving port.
#[derive(Clone)]
pub struct CatalogueService<C, U, R> {
    courses: Arc<C>,
    users: Arc<U>,
    results: Arc<R>,
}

impl<C, U, R> CatalogueService<C, U, R> {
    pub fn new(courses: Arc<C>, users: Arc<U>, results: Arc<R>) -> Self {
        Self {
            courses,
            users,
            results,
        }
    }
}

impl<C, U, R> CatalogueService<C, U, R>
where
    C: CourseRepository,
    U: UserRepository,
    R: ResultRepository,
{
    async fn require_course(&self, id: CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))
    }
}

#[async_trait]
impl<C, U, R> CourseCatalogue for CatalogueService<C, U, R>
where
    C: CourseRepository,
    U: UserRepository,
    R: ResultRepository,
{
    async fn create(&self, draft: CourseDraft) -> Result<Course, Error> {
        let course = Course::from_draft(CourseId::random(), draft);
        self.courses.insert(&course).await?;
        info!(course_id = %course.id(), code = %course.code(), "course created");
        Ok(course)
    }

    async fn list(&self) -> Result<Vec<Course>, Error> {
        Ok(self.courses.list().await?)
    }

    async fn get(&self, id: CourseId) -> Result<CourseDetail, Error> {
        let course = self.require_course(id).await?;
        let users = self.users.find_by_ids(course.registered_students()).await?;
        let mut by_id: HashMap<UserId, StudentSummary> = users
            .iter()
            .map(|user| (user.id(), StudentSummary::from(user)))
            .collect();
        let registered_students = course
            .registered_students()
            .iter()
            .filter_map(|student| by_id.remove(student))
            .collect();
        Ok(CourseDetail {
            course: course.summary(),
            registered_students,
        })
    }

    async fn update(&self, id: CourseId, changes: CourseChanges) -> Result<Course, Error> {
        let course = self.require_course(id).await?.apply(changes);
        self.courses.update(&course).await?;
        Ok(course)
    }

    async fn delete(&self, id: CourseId) -> Result<(), Error> {
        self.require_course(id).await?;
        let removed_results = self.results.delete_for_course(id).await?;
        if !self.courses.delete(id).await? {
            return Err(Error::not_found(format!("course {id} not found")));
        }
        info!(course_id = %id, removed_results, "course deleted");
        Ok(())
    }

    async fn register(&self, id: CourseId, student: UserId) -> Result<Course, Error> {
        self.require_course(id).await?;
        self.courses.add_registration(id, student).await?;
        info!(course_id = %id, student_id = %student, "student registered");
        self.require_course(id).await
    }

    async fn unregister(&self, id: CourseId, student: UserId) -> Result<Course, Error> {
        self.require_course(id).await?;
        self.courses.remove_registration(id, student).await?;
        info!(course_id = %id, student_id = %student, "student dropped");
        self.require_course(id).await
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
