//! Course results: one graded score per student and course.
//!
//! The letter grade and grade point are private and only ever set through
//! [`derive_grade`], so a result can never carry a grade that disagrees with
//! its score.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    CourseId, CourseSummary, GradePoint, LetterGrade, Score, StudentSummary, UserId, derive_grade,
};

/// Stable result identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResultId(Uuid);

/// Error returned when a result identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("result id must be a valid UUID")]
pub struct InvalidResultId;

impl ResultId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidResultId> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| InvalidResultId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ResultId> for String {
    fn from(value: ResultId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ResultId {
    type Error = InvalidResultId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Input to the result write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDraft {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub score: Score,
    /// Defaults to the recording time when absent.
    pub date_achieved: Option<DateTime<Utc>>,
}

/// A graded score for one student in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResult {
    #[schema(value_type = String)]
    id: ResultId,
    #[schema(value_type = String)]
    user_id: UserId,
    #[schema(value_type = String)]
    course_id: CourseId,
    #[schema(value_type = u8, example = 87)]
    score: Score,
    grade: LetterGrade,
    grade_point: GradePoint,
    date_achieved: DateTime<Utc>,
}

impl CourseResult {
    /// Grade a draft and stamp it with `now` when no date was supplied.
    pub fn record(id: ResultId, draft: ResultDraft, now: DateTime<Utc>) -> Self {
        let ResultDraft {
            student_id,
            course_id,
            score,
            date_achieved,
        } = draft;
        Self::graded(
            id,
            student_id,
            course_id,
            score,
            date_achieved.unwrap_or(now),
        )
    }

    /// Rebuild a stored result. The grade is re-derived from the score.
    pub fn restore(
        id: ResultId,
        student_id: UserId,
        course_id: CourseId,
        score: Score,
        date_achieved: DateTime<Utc>,
    ) -> Self {
        Self::graded(id, student_id, course_id, score, date_achieved)
    }

    fn graded(
        id: ResultId,
        user_id: UserId,
        course_id: CourseId,
        score: Score,
        date_achieved: DateTime<Utc>,
    ) -> Self {
        let grading = derive_grade(score);
        Self {
            id,
            user_id,
            course_id,
            score,
            grade: grading.letter(),
            grade_point: grading.point(),
            date_achieved,
        }
    }

    pub fn id(&self) -> ResultId {
        self.id
    }

    pub fn student_id(&self) -> UserId {
        self.user_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn grade(&self) -> LetterGrade {
        self.grade
    }

    pub fn grade_point(&self) -> GradePoint {
        self.grade_point
    }

    pub fn date_achieved(&self) -> DateTime<Utc> {
        self.date_achieved
    }

    /// Replace the score and re-derive the grade.
    pub fn rescore(&mut self, score: Score) {
        let grading = derive_grade(score);
        self.score = score;
        self.grade = grading.letter();
        self.grade_point = grading.point();
    }

    pub fn set_date_achieved(&mut self, date: DateTime<Utc>) {
        self.date_achieved = date;
    }
}

/// Partial result update accepted by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultChanges {
    pub score: Option<Score>,
    pub date_achieved: Option<DateTime<Utc>>,
}

/// A result with its student and course resolved for display.
///
/// Either side is `None` when the referenced record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
    #[serde(flatten)]
    pub result: CourseResult,
    pub student: Option<StudentSummary>,
    pub course: Option<CourseSummary>,
}
