//! Domain primitives, aggregates, services, and ports.
//!
//! Purpose: define the strongly typed student-portal model shared by the
//! HTTP and persistence adapters. Grade derivation and transcript
//! aggregation are pure functions here; everything with side effects goes
//! through a port.
//!
//! Public surface:
//! - [`derive_grade`] and [`compute_transcript`]: the grading core.
//! - [`User`], [`Course`], [`CourseResult`]: aggregates with validated fields.
//! - [`AccountService`], [`CatalogueService`], [`LedgerService`]: driving
//!   port implementations.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.

pub mod accounts_service;
pub mod auth;
pub mod catalogue_service;
pub mod course;
pub mod course_result;
pub mod error;
pub mod grading;
pub mod ledger_service;
pub mod ports;
pub mod trace_id;
pub mod transcript;
pub mod user;

pub use self::accounts_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, PlainPassword, Requester,
    StoredPassword,
};
pub use self::catalogue_service::CatalogueService;
pub use self::course::{
    Course, CourseChanges, CourseCode, CourseDetail, CourseDraft, CourseId, CourseName,
    CourseSummary, CourseValidationError, Credits, RegistrationError,
};
pub use self::course_result::{
    CourseResult, InvalidResultId, ResultChanges, ResultDetail, ResultDraft, ResultId,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::grading::{
    GradePoint, Grading, LetterGrade, Score, ScoreValidationError, UnknownLetterGrade,
    derive_grade,
};
pub use self::ledger_service::LedgerService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transcript::{Cgpa, Transcript, TranscriptEntry, compute_transcript};
pub use self::user::{
    Department, EmailAddress, PERSON_NAME_MAX, PersonName, ProfileChanges, Role, Semester,
    StudentNumber, StudentSummary, User, UserDraft, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
