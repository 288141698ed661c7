//! Driving port for recording and reading course results.
//!
//! Every write goes through the same path: validate references, derive the
//! grade from the score, then persist. Reads fold results into transcripts.

use async_trait::async_trait;

use crate::domain::{
    CourseId, CourseResult, Error, Requester, ResultChanges, ResultDetail, ResultDraft, ResultId,
    Transcript, UserId,
};

/// Domain use-case port for the results ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultLedger: Send + Sync {
    /// Record a new result. Fails with `conflict` when the student already
    /// has a result for the course.
    async fn record(&self, draft: ResultDraft) -> Result<CourseResult, Error>;

    /// Every result, newest first, with student and course resolved.
    async fn list_all(&self) -> Result<Vec<ResultDetail>, Error>;

    /// Results for one course ordered by student id.
    async fn list_for_course(&self, course: CourseId) -> Result<Vec<ResultDetail>, Error>;

    /// A student's transcript. Only admins and the student may read it.
    async fn transcript(&self, requester: Requester, student: UserId)
    -> Result<Transcript, Error>;

    async fn update(&self, id: ResultId, changes: ResultChanges) -> Result<CourseResult, Error>;

    async fn delete(&self, id: ResultId) -> Result<(), Error>;
}
