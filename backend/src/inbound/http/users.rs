//! Users API handlers.
//!
//! ```text
//! POST   /api/users/register
//! POST   /api/users/login
//! POST   /api/users/logout
//! GET    /api/users/profile
//! PUT    /api/users/profile
//! GET    /api/users
//! GET    /api/users/{id}
//! PUT    /api/users/{id}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdate;
use crate::domain::{
    Department, EmailAddress, Error, LoginCredentials, PersonName, PlainPassword, ProfileChanges,
    Role, Semester, StudentNumber, User, UserDraft, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, login_field_error, non_blank, parse_user_id, require, user_field_error,
};

const NAME: FieldName = FieldName::new("name");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const ROLE: FieldName = FieldName::new("role");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const DEPARTMENT: FieldName = FieldName::new("department");
const SEMESTER: FieldName = FieldName::new("semester");
const USER_ID: FieldName = FieldName::new("id");

/// Request body for `POST /api/users/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    /// `student` (default) or `admin`. Creating an admin requires an admin session.
    pub role: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i64>,
}

/// Request body for `POST /api/users/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update. Absent or blank fields keep their current value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub password: Option<String>,
}

fn parse_optional<T, E>(
    value: Option<String>,
    field: FieldName,
    parse: impl FnOnce(String) -> Result<T, E>,
    map: impl FnOnce(FieldName, E) -> Error,
) -> Result<Option<T>, Error> {
    non_blank(value)
        .map(parse)
        .transpose()
        .map_err(|err| map(field, err))
}

fn parse_semester(value: Option<i64>) -> Result<Option<Semester>, Error> {
    value
        .map(Semester::new)
        .transpose()
        .map_err(|err| user_field_error(SEMESTER, err))
}

fn parse_register_request(payload: RegisterRequest) -> Result<(UserDraft, PlainPassword), Error> {
    let name = require(payload.name, NAME)?;
    let email = require(payload.email, EMAIL)?;
    let password = require(payload.password, PASSWORD)?;

    let draft = UserDraft {
        name: PersonName::new(name).map_err(|err| user_field_error(NAME, err))?,
        email: EmailAddress::new(email).map_err(|err| user_field_error(EMAIL, err))?,
        role: parse_optional(payload.role, ROLE, |raw| raw.parse::<Role>(), user_field_error)?
            .unwrap_or_default(),
        student_id: parse_optional(
            payload.student_id,
            STUDENT_ID,
            StudentNumber::new,
            user_field_error,
        )?,
        department: parse_optional(
            payload.department,
            DEPARTMENT,
            Department::new,
            user_field_error,
        )?,
        semester: parse_semester(payload.semester)?,
    };
    let password = PlainPassword::new_secret(&password).map_err(login_field_error)?;
    Ok((draft, password))
}

fn parse_update_request(payload: UpdateUserRequest) -> Result<ProfileUpdate, Error> {
    let changes = ProfileChanges {
        name: parse_optional(payload.name, NAME, PersonName::new, user_field_error)?,
        email: parse_optional(payload.email, EMAIL, EmailAddress::new, user_field_error)?,
        student_id: parse_optional(
            payload.student_id,
            STUDENT_ID,
            StudentNumber::new,
            user_field_error,
        )?,
        department: parse_optional(
            payload.department,
            DEPARTMENT,
            Department::new,
            user_field_error,
        )?,
        semester: parse_semester(payload.semester)?,
    };
    let password = payload
        .password
        .filter(|raw| !raw.is_empty())
        .map(|raw| PlainPassword::new_secret(&raw))
        .transpose()
        .map_err(login_field_error)?;
    Ok(ProfileUpdate { changes, password })
}

fn parse_path_user_id(raw: &str) -> Result<UserId, Error> {
    parse_user_id(raw, USER_ID)
}

/// Create an account and sign the new user in.
///
/// An admin session may create admin accounts; its own session is kept.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Admin accounts require an admin session", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let (draft, password) = parse_register_request(payload.into_inner())?;
    let signed_in_admin = match session.user_id()? {
        Some(_) => current_user(&state, &session)
            .await
            .is_ok_and(|caller| caller.is_admin()),
        None => false,
    };
    if draft.role == Role::Admin && !signed_in_admin {
        return Err(Error::forbidden("admin role required to create admin accounts"));
    }

    let user = state.accounts.register(draft, password).await?;
    if !signed_in_admin {
        session.persist_user(user.id())?;
    }
    Ok(HttpResponse::Created().json(user))
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(login_field_error)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(user.id())?;
    info!(user_id = %user.id(), "user signed in");
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/users/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    current_user(&state, &session).await.map(web::Json)
}

/// Update the signed-in user's profile.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let user = current_user(&state, &session).await?;
    let update = parse_update_request(payload.into_inner())?;
    state.accounts.update(user.id(), update).await.map(web::Json)
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    require_admin(&state, &session).await?;
    state.accounts.list().await.map(web::Json)
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    require_admin(&state, &session).await?;
    let id = parse_path_user_id(&path)?;
    state.accounts.get(id).await.map(web::Json)
}

/// Update any user's profile.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    require_admin(&state, &session).await?;
    let id = parse_path_user_id(&path)?;
    let update = parse_update_request(payload.into_inner())?;
    state.accounts.update(id, update).await.map(web::Json)
}

/// Delete a user together with their results and course registrations.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let id = parse_path_user_id(&path)?;
    state.accounts.delete(id).await?;
    info!(admin_id = %admin.id(), user_id = %id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}
