//! Tests for the account service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockCourseRepository, MockPasswordHasher, MockResultRepository, MockUserRepository,
    UserPersistenceError,
};
use crate::domain::{
    EmailAddress, ErrorCode, PersonName, ProfileChanges, Role, StoredPassword, StudentNumber,
};

type TestService = AccountService<
    MockUserRepository,
    MockCourseRepository,
    MockResultRepository,
    MockPasswordHasher,
>;

struct Mocks {
    users: MockUserRepository,
    courses: MockCourseRepository,
    results: MockResultRepository,
    hasher: MockPasswordHasher,
}

impl Mocks {
    fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            courses: MockCourseRepository::new(),
            results: MockResultRepository::new(),
            hasher: MockPasswordHasher::new(),
        }
    }

    fn into_service(self) -> TestService {
        AccountService::new(
            Arc::new(self.users),
            Arc::new(self.courses),
            Arc::new(self.results),
            Arc::new(self.hasher),
        )
    }
}

fn draft(email: &str) -> UserDraft {
    UserDraft {
        name: PersonName::new("Ada Lovelace").expect("name"),
        email: EmailAddress::new(email).expect("email"),
        role: Role::Student,
        student_id: Some(StudentNumber::new("CS2023001").expect("student number")),
        department: None,
        semester: None,
    }
}

fn stored_user(email: &str) -> User {
    User::from_draft(UserId::random(), draft(email))
}

fn password(raw: &str) -> PlainPassword {
    PlainPassword::new(raw).expect("password")
}

#[tokio::test]
async fn register_hashes_password_before_insert() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    mocks
        .hasher
        .expect_hash()
        .withf(|password| password.expose() == "secret1")
        .return_once(|_| Ok(StoredPassword::new("$argon2id$hash")));
    mocks
        .users
        .expect_insert()
        .withf(|user, stored| {
            user.email().as_ref() == "ada@example.com" && stored.as_str() == "$argon2id$hash"
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let user = mocks
        .into_service()
        .register(draft("ada@example.com"), password("secret1"))
        .await
        .expect("registered");

    assert_eq!(user.role(), Role::Student);
    assert_eq!(user.name().as_ref(), "Ada Lovelace");
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut mocks = Mocks::new();
    let existing = stored_user("ada@example.com");
    mocks
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(existing)));
    mocks.users.expect_insert().never();

    let error = mocks
        .into_service()
        .register(draft("ada@example.com"), password("secret1"))
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn register_maps_racing_duplicate_to_conflict() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_email().return_once(|_| Ok(None));
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok(StoredPassword::new("$argon2id$hash")));
    mocks
        .users
        .expect_insert()
        .return_once(|_, _| Err(UserPersistenceError::duplicate_email("ada@example.com")));

    let error = mocks
        .into_service()
        .register(draft("ada@example.com"), password("secret1"))
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn login_returns_user_when_password_matches() {
    let mut mocks = Mocks::new();
    let user = stored_user("ada@example.com");
    let expected = user.clone();
    mocks
        .users
        .expect_find_credentials()
        .return_once(move |_| Ok(Some((user, StoredPassword::new("$argon2id$hash")))));
    mocks.hasher.expect_verify().return_const(true);

    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", "secret1").expect("credentials");
    let user = mocks
        .into_service()
        .login(&credentials)
        .await
        .expect("logged in");

    assert_eq!(user, expected);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let mut mocks = Mocks::new();
    let user = stored_user("ada@example.com");
    mocks
        .users
        .expect_find_credentials()
        .return_once(move |_| Ok(Some((user, StoredPassword::new("$argon2id$hash")))));
    mocks.hasher.expect_verify().return_const(false);

    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", "wrong").expect("credentials");
    let error = mocks
        .into_service()
        .login(&credentials)
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[tokio::test]
async fn login_rejects_unknown_email_with_same_message() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_credentials().return_once(|_| Ok(None));
    mocks.hasher.expect_verify().never();

    let credentials =
        LoginCredentials::try_from_parts("nobody@example.com", "secret1").expect("credentials");
    let error = mocks
        .into_service()
        .login(&credentials)
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[tokio::test]
async fn update_keeps_absent_fields_and_rehashes_password() {
    let mut mocks = Mocks::new();
    let user = stored_user("ada@example.com");
    let id = user.id();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    mocks
        .users
        .expect_update()
        .withf(|user| {
            user.name().as_ref() == "Ada King" && user.email().as_ref() == "ada@example.com"
        })
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok(StoredPassword::new("$argon2id$new")));
    mocks
        .users
        .expect_set_password()
        .withf(move |user_id, stored| *user_id == id && stored.as_str() == "$argon2id$new")
        .times(1)
        .return_once(|_, _| Ok(()));

    let update = ProfileUpdate {
        changes: ProfileChanges {
            name: Some(PersonName::new("Ada King").expect("name")),
            ..ProfileChanges::default()
        },
        password: Some(password("another1")),
    };
    let user = mocks
        .into_service()
        .update(id, update)
        .await
        .expect("updated");

    assert_eq!(user.name().as_ref(), "Ada King");
    assert_eq!(
        user.student_id().map(ToString::to_string).as_deref(),
        Some("CS2023001")
    );
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks.users.expect_update().never();

    let error = mocks
        .into_service()
        .update(UserId::random(), ProfileUpdate::default())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_cascades_results_and_registrations() {
    let mut mocks = Mocks::new();
    let user = stored_user("ada@example.com");
    let id = user.id();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    mocks
        .results
        .expect_delete_for_student()
        .withf(move |student| *student == id)
        .times(1)
        .return_once(|_| Ok(2));
    mocks
        .courses
        .expect_remove_student()
        .withf(move |student| *student == id)
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .users
        .expect_delete()
        .times(1)
        .return_once(|_| Ok(true));

    mocks.into_service().delete(id).await.expect("deleted");
}

#[tokio::test]
async fn delete_missing_user_touches_nothing() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks.results.expect_delete_for_student().never();
    mocks.courses.expect_remove_student().never();

    let error = mocks
        .into_service()
        .delete(UserId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn repository_outage_is_service_unavailable() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_list()
        .return_once(|| Err(UserPersistenceError::connection("refused")));

    let error = mocks.into_service().list().await.expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
