//! In-memory `CourseRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseDraft, CourseId, RegistrationError, UserId};

use super::poisoned;

/// Courses kept in creation order.
#[derive(Debug, Default)]
pub struct MemoryCourseRepository {
    courses: Mutex<Vec<Course>>,
}

impl MemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn courses(&self) -> Result<MutexGuard<'_, Vec<Course>>, CourseRepositoryError> {
        self.courses
            .lock()
            .map_err(|_| poisoned(CourseRepositoryError::query))
    }

    /// Apply a roster change to one course while holding the lock.
    fn change_roster(
        &self,
        id: CourseId,
        change: impl FnOnce(&mut Course) -> Result<(), RegistrationError>,
    ) -> Result<(), CourseRepositoryError> {
        let mut courses = self.courses()?;
        let course = courses
            .iter_mut()
            .find(|course| course.id() == id)
            .ok_or_else(CourseRepositoryError::course_missing)?;
        change(course).map_err(|error| match error {
            RegistrationError::AlreadyRegistered => CourseRepositoryError::already_registered(),
            RegistrationError::NotRegistered => CourseRepositoryError::not_registered(),
        })
    }
}

/// Reject a course whose code or name is already taken by another course.
fn ensure_unique(courses: &[Course], course: &Course) -> Result<(), CourseRepositoryError> {
    for other in courses.iter().filter(|other| other.id() != course.id()) {
        if other.code() == course.code() {
            return Err(CourseRepositoryError::duplicate(format!(
                "code {}",
                course.code()
            )));
        }
        if other.name() == course.name() {
            return Err(CourseRepositoryError::duplicate(format!(
                "name {}",
                course.name()
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl CourseRepository for MemoryCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut courses = self.courses()?;
        ensure_unique(&courses, course)?;
        courses.push(course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut courses = self.courses()?;
        ensure_unique(&courses, course)?;
        let stored = courses
            .iter_mut()
            .find(|stored| stored.id() == course.id())
            .ok_or_else(|| CourseRepositoryError::query("course not found for update"))?;
        let draft = CourseDraft {
            code: course.code().clone(),
            name: course.name().clone(),
            credits: course.credits(),
        };
        *stored = Course::restore(course.id(), draft, stored.registered_students().to_vec());
        Ok(())
    }

    async fn add_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError> {
        self.change_roster(course, |course| course.register(student))
    }

    async fn remove_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError> {
        self.change_roster(course, |course| course.drop_student(student))
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self
            .courses()?
            .iter()
            .find(|course| course.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(self
            .courses()?
            .iter()
            .filter(|course| ids.contains(&course.id()))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(self.courses()?.clone())
    }

    async fn delete(&self, id: CourseId) -> Result<bool, CourseRepositoryError> {
        let mut courses = self.courses()?;
        let before = courses.len();
        courses.retain(|course| course.id() != id);
        Ok(courses.len() < before)
    }

    async fn remove_student(&self, student: UserId) -> Result<(), CourseRepositoryError> {
        let mut courses = self.courses()?;
        for course in courses
            .iter_mut()
            .filter(|course| course.is_registered(student))
        {
            // Membership was just checked, so dropping cannot fail.
            let _ = course.drop_student(student);
        }
        Ok(())
    }
}
