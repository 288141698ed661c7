//! Results ledger domain service.
//!
//! The write path is explicit: confirm the student and course exist, refuse
//! a second result for the same pair, derive the grade, then persist. The
//! repository's unique constraint backs up the pre-insert check when two
//! writers race.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CourseRepository, ResultLedger, ResultRepository, UserRepository};
use crate::domain::{
    CourseId, CourseResult, CourseSummary, Error, Requester, ResultChanges, ResultDetail,
    ResultDraft, ResultId, StudentSummary, Transcript, UserId, compute_transcript,
};

/// Results ledger service implementing the [`ResultLedger`] driving port.
#[derive(Clone)]
pub struct LedgerService<R, U, C> {
    results: Arc<R>,
    users: Arc<U>,
    courses: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<R, U, C> LedgerService<R, U, C> {
    pub fn new(results: Arc<R>, users: Arc<U>, courses: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            results,
            users,
            courses,
            clock,
        }
    }
}

impl<R, U, C> LedgerService<R, U, C>
where
    R: ResultRepository,
    U: UserRepository,
    C: CourseRepository,
{
    async fn require_result(&self, id: ResultId) -> Result<CourseResult, Error> {
        self.results
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("result {id} not found")))
    }

    /// Course summaries keyed by id for every course the results mention.
    async fn course_index(
        &self,
        results: &[CourseResult],
    ) -> Result<HashMap<CourseId, CourseSummary>, Error> {
        let ids: Vec<CourseId> = results
            .iter()
            .map(CourseResult::course_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let courses = self.courses.find_by_ids(&ids).await?;
        Ok(courses
            .iter()
            .map(|course| (course.id(), course.summary()))
            .collect())
    }

    async fn student_index(
        &self,
        results: &[CourseResult],
    ) -> Result<HashMap<UserId, StudentSummary>, Error> {
        let ids: Vec<UserId> = results
            .iter()
            .map(CourseResult::student_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.find_by_ids(&ids).await?;
        Ok(users
            .iter()
            .map(|user| (user.id(), StudentSummary::from(user)))
            .collect())
    }

    async fn with_details(&self, results: Vec<CourseResult>) -> Result<Vec<ResultDetail>, Error> {
        let courses = self.course_index(&results).await?;
        let students = self.student_index(&results).await?;
        Ok(results
            .into_iter()
            .map(|result| ResultDetail {
                student: students.get(&result.student_id()).cloned(),
                course: courses.get(&result.course_id()).cloned(),
                result,
            })
            .collect())
    }
}

#[async_trait]
impl<R, U, C> ResultLedger for LedgerService<R, U, C>
where
    R: ResultRepository,
    U: UserRepository,
    C: CourseRepository,
{
    async fn record(&self, draft: ResultDraft) -> Result<CourseResult, Error> {
        if self.users.find_by_id(draft.student_id).await?.is_none() {
            return Err(Error::not_found("student not found"));
        }
        if self.courses.find_by_id(draft.course_id).await?.is_none() {
            return Err(Error::not_found("course not found"));
        }
        if self
            .results
            .find_for_student_and_course(draft.student_id, draft.course_id)
            .await?
            .is_some()
        {
            return Err(Error::conflict(
                "result already exists for this student and course",
            ));
        }

        let result = CourseResult::record(ResultId::random(), draft, self.clock.utc());
        self.results.insert(&result).await?;
        info!(
            result_id = %result.id(),
            student_id = %result.student_id(),
            course_id = %result.course_id(),
            grade = %result.grade(),
            "result recorded"
        );
        Ok(result)
    }

    async fn list_all(&self) -> Result<Vec<ResultDetail>, Error> {
        let mut results = self.results.list_all().await?;
        results.sort_by(|a, b| b.date_achieved().cmp(&a.date_achieved()));
        self.with_details(results).await
    }

    async fn list_for_course(&self, course: CourseId) -> Result<Vec<ResultDetail>, Error> {
        if self.courses.find_by_id(course).await?.is_none() {
            return Err(Error::not_found(format!("course {course} not found")));
        }
        let mut results = self.results.list_for_course(course).await?;
        results.sort_by_key(CourseResult::student_id);
        self.with_details(results).await
    }

    async fn transcript(
        &self,
        requester: Requester,
        student: UserId,
    ) -> Result<Transcript, Error> {
        if !requester.may_view_student(student) {
            return Err(Error::forbidden("not allowed to view this student's results"));
        }
        if self.users.find_by_id(student).await?.is_none() {
            return Err(Error::not_found(format!("user {student} not found")));
        }
        let results = self.results.list_for_student(student).await?;
        let courses = self.course_index(&results).await?;
        Ok(compute_transcript(results, |result| {
            courses.get(&result.course_id()).cloned()
        }))
    }

    async fn update(&self, id: ResultId, changes: ResultChanges) -> Result<CourseResult, Error> {
        let mut result = self.require_result(id).await?;
        if let Some(score) = changes.score {
            result.rescore(score);
        }
        if let Some(date) = changes.date_achieved {
            result.set_date_achieved(date);
        }
        self.results.update(&result).await?;
        Ok(result)
    }

    async fn delete(&self, id: ResultId) -> Result<(), Error> {
        if !self.results.delete(id).await? {
            return Err(Error::not_found(format!("result {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
