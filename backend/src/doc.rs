//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler, the health probes, the domain
//! payload schemas and the session cookie security scheme. Swagger UI serves
//! it in debug builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Course, CourseDetail, CourseResult, CourseSummary, Error, ErrorCode, GradePoint, LetterGrade,
    ResultDetail, Role, StudentSummary, Transcript, TranscriptEntry, User,
};
use crate::inbound::http::courses::{CreateCourseRequest, UpdateCourseRequest};
use crate::inbound::http::health::Welcome;
use crate::inbound::http::results::{RecordResultRequest, UpdateResultRequest};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, UpdateUserRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/users/login or /api/users/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Student Portal API",
        description = "Users, courses, graded results and CGPA transcripts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::health::welcome,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::courses::register_for_course,
        crate::inbound::http::courses::drop_course,
        crate::inbound::http::results::record_result,
        crate::inbound::http::results::list_results,
        crate::inbound::http::results::student_transcript,
        crate::inbound::http::results::course_results,
        crate::inbound::http::results::update_result,
        crate::inbound::http::results::delete_result,
    ),
    components(schemas(
        User,
        Role,
        StudentSummary,
        Course,
        CourseSummary,
        CourseDetail,
        CourseResult,
        LetterGrade,
        GradePoint,
        ResultDetail,
        Transcript,
        TranscriptEntry,
        Error,
        ErrorCode,
        Welcome,
        RegisterRequest,
        LoginRequest,
        UpdateUserRequest,
        CreateCourseRequest,
        UpdateCourseRequest,
        RecordResultRequest,
        UpdateResultRequest,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and profiles"),
        (name = "courses", description = "Course catalogue and registration"),
        (name = "results", description = "Graded results and transcripts"),
        (name = "health", description = "Welcome message and health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_properties(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).unwrap_or_else(|| panic!("{name} schema")) {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/api")]
    #[case("/api/users/register")]
    #[case("/api/users/profile")]
    #[case("/api/users/{id}")]
    #[case("/api/courses/{id}/register")]
    #[case("/api/results/student/{userId}")]
    #[case("/api/results/course/{courseId}")]
    #[case("/health/ready")]
    fn documents_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn user_schema_never_exposes_the_password() {
        let fields = schema_properties("User");
        assert!(fields.iter().any(|field| field == "email"));
        assert!(fields.iter().all(|field| field != "password"));
    }

    #[rstest]
    fn error_schema_has_code_and_message() {
        let fields = schema_properties("Error");
        assert!(fields.iter().any(|field| field == "code"));
        assert!(fields.iter().any(|field| field == "message"));
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
