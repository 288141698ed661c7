//! Results API handlers.
//!
//! ```text
//! POST   /api/results
//! GET    /api/results
//! GET    /api/results/student/{userId}
//! GET    /api/results/course/{courseId}
//! PUT    /api/results/{id}
//! DELETE /api/results/{id}
//! ```
//!
//! Grades are always derived from the score. Update bodies reject `grade`
//! and `gradePoint` outright so a client cannot believe it set them.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    CourseResult, Error, ResultChanges, ResultDetail, ResultDraft, Score, Transcript,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_admin, require_requester};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_course_id, parse_optional_rfc3339_timestamp, parse_result_id,
    parse_user_id, require, score_field_error,
};

const USER_ID: FieldName = FieldName::new("userId");
const COURSE_ID: FieldName = FieldName::new("courseId");
const SCORE: FieldName = FieldName::new("score");
const DATE_ACHIEVED: FieldName = FieldName::new("dateAchieved");
const RESULT_ID: FieldName = FieldName::new("id");

/// Request body for `POST /api/results`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResultRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Option<String>,
    #[schema(example = "5b0c7a8e-2f4d-4b8e-9a51-6f0f5c4f7d21")]
    pub course_id: Option<String>,
    #[schema(example = 87)]
    pub score: Option<i64>,
    /// RFC 3339 timestamp. Defaults to the time of recording.
    #[schema(example = "2024-05-01T09:00:00Z")]
    pub date_achieved: Option<String>,
}

/// Request body for `PUT /api/results/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateResultRequest {
    pub score: Option<i64>,
    pub date_achieved: Option<String>,
}

fn parse_score(value: i64) -> Result<Score, Error> {
    Score::new(value).map_err(|err| score_field_error(SCORE, err))
}

fn parse_record_request(payload: RecordResultRequest) -> Result<ResultDraft, Error> {
    let student_id = parse_user_id(&require(payload.user_id, USER_ID)?, USER_ID)?;
    let course_id = parse_course_id(&require(payload.course_id, COURSE_ID)?, COURSE_ID)?;
    let score = parse_score(require(payload.score, SCORE)?)?;
    let date_achieved =
        parse_optional_rfc3339_timestamp(payload.date_achieved.as_deref(), DATE_ACHIEVED)?;
    Ok(ResultDraft {
        student_id,
        course_id,
        score,
        date_achieved,
    })
}

fn parse_update_request(payload: UpdateResultRequest) -> Result<ResultChanges, Error> {
    Ok(ResultChanges {
        score: payload.score.map(parse_score).transpose()?,
        date_achieved: parse_optional_rfc3339_timestamp(
            payload.date_achieved.as_deref(),
            DATE_ACHIEVED,
        )?,
    })
}

/// Record a graded result for a student in a course.
#[utoipa::path(
    post,
    path = "/api/results",
    request_body = RecordResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = CourseResult),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Student or course not found", body = Error),
        (status = 409, description = "Result already recorded", body = Error)
    ),
    tags = ["results"],
    operation_id = "recordResult"
)]
#[post("/results")]
pub async fn record_result(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecordResultRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let draft = parse_record_request(payload.into_inner())?;
    let result = state.ledger.record(draft).await?;
    Ok(HttpResponse::Created().json(result))
}

/// List every result, newest first.
#[utoipa::path(
    get,
    path = "/api/results",
    responses(
        (status = 200, description = "Results", body = [ResultDetail]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["results"],
    operation_id = "listResults"
)]
#[get("/results")]
pub async fn list_results(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ResultDetail>>> {
    require_admin(&state, &session).await?;
    state.ledger.list_all().await.map(web::Json)
}

/// A student's transcript with credit-weighted CGPA.
///
/// Students may only read their own transcript.
#[utoipa::path(
    get,
    path = "/api/results/student/{userId}",
    params(("userId" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Transcript", body = Transcript),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Student not found", body = Error)
    ),
    tags = ["results"],
    operation_id = "studentTranscript"
)]
#[get("/results/student/{user_id}")]
pub async fn student_transcript(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Transcript>> {
    let requester = require_requester(&state, &session).await?;
    let student = parse_user_id(&path, USER_ID)?;
    state
        .ledger
        .transcript(requester, student)
        .await
        .map(web::Json)
}

/// Results recorded for one course, ordered by student id.
#[utoipa::path(
    get,
    path = "/api/results/course/{courseId}",
    params(("courseId" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Results", body = [ResultDetail]),
        (status = 400, description = "Invalid course id", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["results"],
    operation_id = "courseResults"
)]
#[get("/results/course/{course_id}")]
pub async fn course_results(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ResultDetail>>> {
    require_admin(&state, &session).await?;
    let course = parse_course_id(&path, COURSE_ID)?;
    state.ledger.list_for_course(course).await.map(web::Json)
}

/// Change a result's score or date. The grade is re-derived.
#[utoipa::path(
    put,
    path = "/api/results/{id}",
    params(("id" = String, Path, description = "Result id")),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Updated result", body = CourseResult),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Result not found", body = Error)
    ),
    tags = ["results"],
    operation_id = "updateResult"
)]
#[put("/results/{id}")]
pub async fn update_result(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateResultRequest>,
) -> ApiResult<web::Json<CourseResult>> {
    require_admin(&state, &session).await?;
    let id = parse_result_id(&path, RESULT_ID)?;
    let changes = parse_update_request(payload.into_inner())?;
    state.ledger.update(id, changes).await.map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    params(("id" = String, Path, description = "Result id")),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 400, description = "Invalid result id", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Result not found", body = Error)
    ),
    tags = ["results"],
    operation_id = "deleteResult"
)]
#[delete("/results/{id}")]
pub async fn delete_result(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let id = parse_result_id(&path, RESULT_ID)?;
    state.ledger.delete(id).await?;
    info!(admin_id = %admin.id(), result_id = %id, "result deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
