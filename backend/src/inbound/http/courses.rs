//! Courses API handlers.
//!
//! ```text
//! POST   /api/courses
//! GET    /api/courses
//! GET    /api/courses/{id}
//! PUT    /api/courses/{id}
//! DELETE /api/courses/{id}
//! POST   /api/courses/{id}/register
//! DELETE /api/courses/{id}/register
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Course, CourseChanges, CourseCode, CourseDetail, CourseDraft, CourseId, CourseName, Credits,
    Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_admin, require_requester, require_student};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, course_field_error, non_blank, parse_course_id, require,
};

const COURSE_CODE: FieldName = FieldName::new("courseCode");
const COURSE_NAME: FieldName = FieldName::new("courseName");
const CREDITS: FieldName = FieldName::new("credits");
const COURSE_ID: FieldName = FieldName::new("id");

/// Request body for `POST /api/courses`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[schema(example = "CS101")]
    pub course_code: Option<String>,
    #[schema(example = "Introduction to Programming")]
    pub course_name: Option<String>,
    #[schema(example = 3)]
    pub credits: Option<i64>,
}

/// Partial course update. Absent or blank fields keep their current value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<i64>,
}

fn parse_credits(value: i64) -> Result<Credits, Error> {
    Credits::new(value).map_err(|err| course_field_error(CREDITS, err))
}

fn parse_create_request(payload: CreateCourseRequest) -> Result<CourseDraft, Error> {
    let code = require(payload.course_code, COURSE_CODE)?;
    let name = require(payload.course_name, COURSE_NAME)?;
    let credits = require(payload.credits, CREDITS)?;
    Ok(CourseDraft {
        code: CourseCode::new(code).map_err(|err| course_field_error(COURSE_CODE, err))?,
        name: CourseName::new(name).map_err(|err| course_field_error(COURSE_NAME, err))?,
        credits: parse_credits(credits)?,
    })
}

fn parse_update_request(payload: UpdateCourseRequest) -> Result<CourseChanges, Error> {
    Ok(CourseChanges {
        code: non_blank(payload.course_code)
            .map(CourseCode::new)
            .transpose()
            .map_err(|err| course_field_error(COURSE_CODE, err))?,
        name: non_blank(payload.course_name)
            .map(CourseName::new)
            .transpose()
            .map_err(|err| course_field_error(COURSE_NAME, err))?,
        credits: payload.credits.map(parse_credits).transpose()?,
    })
}

fn parse_path_course_id(raw: &str) -> Result<CourseId, Error> {
    parse_course_id(raw, COURSE_ID)
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Course code or name already exists", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCourseRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let draft = parse_create_request(payload.into_inner())?;
    let course = state.catalogue.create(draft).await?;
    Ok(HttpResponse::Created().json(course))
}

/// List every course.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses", body = [Course]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Course>>> {
    require_requester(&state, &session).await?;
    state.catalogue.list().await.map(web::Json)
}

/// Fetch one course with its registered students.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseDetail),
        (status = 400, description = "Invalid course id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseDetail>> {
    require_requester(&state, &session).await?;
    let id = parse_path_course_id(&path)?;
    state.catalogue.get(id).await.map(web::Json)
}

/// Update a course's code, name, or credits.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = Course),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 409, description = "Course code or name already exists", body = Error)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateCourseRequest>,
) -> ApiResult<web::Json<Course>> {
    require_admin(&state, &session).await?;
    let id = parse_path_course_id(&path)?;
    let changes = parse_update_request(payload.into_inner())?;
    state.catalogue.update(id, changes).await.map(web::Json)
}

/// Delete a course and every result recorded against it.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 400, description = "Invalid course id", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let id = parse_path_course_id(&path)?;
    state.catalogue.delete(id).await?;
    info!(admin_id = %admin.id(), course_id = %id, "course deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Register the signed-in student for a course.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/register",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Registration recorded", body = Course),
        (status = 400, description = "Already registered or invalid id", body = Error),
        (status = 403, description = "Students only", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "registerForCourse"
)]
#[post("/courses/{id}/register")]
pub async fn register_for_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Course>> {
    let student = require_student(&state, &session).await?;
    let id = parse_path_course_id(&path)?;
    state
        .catalogue
        .register(id, student.id())
        .await
        .map(web::Json)
}

/// Drop the signed-in student from a course.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/register",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Registration removed", body = Course),
        (status = 400, description = "Not registered or invalid id", body = Error),
        (status = 403, description = "Students only", body = Error),
        (status = 404, description = "Course not found", body = Error)
    ),
    tags = ["courses"],
    operation_id = "dropCourse"
)]
#[delete("/courses/{id}/register")]
pub async fn drop_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Course>> {
    let student = require_student(&state, &session).await?;
    let id = parse_path_course_id(&path)?;
    state
        .catalogue
        .unregister(id, student.id())
        .await
        .map(web::Json)
}
