//! End-to-end workflow through the public `/api` route table.
//!
//! An admin seeds the catalogue, a student registers and enrols, the admin
//! records results, and the student reads a transcript. Everything runs over
//! in-memory repositories behind the real session middleware.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use portal::domain::ports::{PasswordHasher, UserRepository};
use portal::domain::{EmailAddress, PersonName, PlainPassword, Role, User, UserDraft, UserId};
use portal::inbound::http::routes;
use portal::inbound::http::state::{HttpState, Repositories};
use portal::outbound::memory::{
    MemoryCourseRepository, MemoryResultRepository, MemoryUserRepository,
};
use portal::outbound::security::Argon2PasswordHasher;
use rstest::rstest;
use serde_json::{Value, json};

const ADMIN_EMAIL: &str = "registrar@example.com";
const ADMIN_PASSWORD: &str = "registrar-secret";

async fn seeded_state() -> HttpState {
    let users = Arc::new(MemoryUserRepository::new());
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let admin = User::from_draft(
        UserId::random(),
        UserDraft {
            name: PersonName::new("Registrar").expect("name"),
            email: EmailAddress::new(ADMIN_EMAIL).expect("email"),
            role: Role::Admin,
            student_id: None,
            department: None,
            semester: None,
        },
    );
    let stored = hasher
        .hash(&PlainPassword::new(ADMIN_PASSWORD).expect("password"))
        .expect("hash");
    users.insert(&admin, &stored).await.expect("seed admin");

    HttpState::from_repositories(
        Repositories {
            users,
            courses: Arc::new(MemoryCourseRepository::new()),
            results: Arc::new(MemoryResultRepository::new()),
        },
        hasher,
        Arc::new(DefaultClock),
    )
}

async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: actix_test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> ServiceResponse {
    let req = match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    actix_test::call_service(app, req.to_request()).await
}

fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

async fn json_body(res: ServiceResponse) -> Value {
    actix_test::read_body_json(res).await
}

#[rstest]
#[actix_web::test]
async fn student_enrols_and_reads_a_graded_transcript() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(seeded_state().await))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
            )
            .service(web::scope("/api").configure(routes::configure)),
    )
    .await;

    let welcome = json_body(send(&app, actix_test::TestRequest::get().uri("/api"), None).await).await;
    assert_eq!(welcome["message"], "Welcome to Student Portal API");

    let login = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        None,
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let admin = session_cookie(&login);

    let mut course_ids = Vec::new();
    for (code, name, credits) in [("CS101", "Programming", 4), ("MA201", "Linear Algebra", 3)] {
        let res = send(
            &app,
            actix_test::TestRequest::post().uri("/api/courses").set_json(json!({
                "courseCode": code,
                "courseName": name,
                "credits": credits,
            })),
            Some(&admin),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let course = json_body(res).await;
        course_ids.push(course["id"].as_str().expect("course id").to_owned());
    }

    let registered = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "password": "secret1",
                "studentId": "CS2023001",
                "department": "Computer Science",
                "semester": 3,
            })),
        None,
    )
    .await;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let student = session_cookie(&registered);
    let ada = json_body(registered).await;
    let ada_id = ada["id"].as_str().expect("user id").to_owned();

    for course_id in &course_ids {
        let res = send(
            &app,
            actix_test::TestRequest::post().uri(&format!("/api/courses/{course_id}/register")),
            Some(&student),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let detail = json_body(
        send(
            &app,
            actix_test::TestRequest::get().uri(&format!("/api/courses/{}", course_ids[0])),
            Some(&student),
        )
        .await,
    )
    .await;
    assert_eq!(detail["registeredStudents"][0]["studentId"], "CS2023001");

    for (course_id, score, date) in [
        (&course_ids[0], 82, "2024-01-15T00:00:00Z"),
        (&course_ids[1], 68, "2024-06-01T00:00:00Z"),
    ] {
        let res = send(
            &app,
            actix_test::TestRequest::post().uri("/api/results").set_json(json!({
                "userId": ada_id,
                "courseId": course_id,
                "score": score,
                "dateAchieved": date,
            })),
            Some(&admin),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let transcript = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/results/student/{ada_id}")),
        Some(&student),
    )
    .await;
    assert_eq!(transcript.status(), StatusCode::OK);
    let transcript = json_body(transcript).await;
    assert_eq!(transcript["totalCredits"], 7);
    assert_eq!(transcript["cgpa"], 3.27);
    let grades: Vec<&str> = transcript["results"]
        .as_array()
        .expect("results")
        .iter()
        .map(|entry| entry["grade"].as_str().expect("grade"))
        .collect();
    assert_eq!(grades, ["B-", "A-"]);

    let deleted = send(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/users/{ada_id}")),
        Some(&admin),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let remaining = json_body(
        send(&app, actix_test::TestRequest::get().uri("/api/results"), Some(&admin)).await,
    )
    .await;
    assert_eq!(remaining, json!([]));

    let stale = send(
        &app,
        actix_test::TestRequest::get().uri("/api/users/profile"),
        Some(&student),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("/api/courses")]
#[case("/api/results")]
#[case("/api/users")]
#[actix_web::test]
async fn anonymous_callers_are_turned_away(#[case] path: &str) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(seeded_state().await))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
            )
            .service(web::scope("/api").configure(routes::configure)),
    )
    .await;

    let res = send(&app, actix_test::TestRequest::get().uri(path), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["code"], "unauthorized");
}
