//! Tests for the course catalogue service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    CourseRepositoryError, MockCourseRepository, MockResultRepository, MockUserRepository,
};
use crate::domain::{
    CourseCode, CourseName, Credits, EmailAddress, ErrorCode, PersonName, Role, User, UserDraft,
};

type TestService = CatalogueService<MockCourseRepository, MockUserRepository, MockResultRepository>;

fn make_service(
    courses: MockCourseRepository,
    users: MockUserRepository,
    results: MockResultRepository,
) -> TestService {
    CatalogueService::new(Arc::new(courses), Arc::new(users), Arc::new(results))
}

fn course_draft() -> CourseDraft {
    CourseDraft {
        code: CourseCode::new("CS101").expect("code"),
        name: CourseName::new("Introduction to Programming").expect("name"),
        credits: Credits::new(3).expect("credits"),
    }
}

fn student(name: &str, email: &str) -> User {
    User::from_draft(
        UserId::random(),
        UserDraft {
            name: PersonName::new(name).expect("name"),
            email: EmailAddress::new(email).expect("email"),
            role: Role::Student,
            student_id: None,
            department: None,
            semester: None,
        },
    )
}

#[tokio::test]
async fn create_persists_course_without_registrations() {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_insert()
        .withf(|course| course.registered_students().is_empty())
        .times(1)
        .return_once(|_| Ok(()));

    let course = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .create(course_draft())
        .await
        .expect("created");

    assert_eq!(course.code().as_ref(), "CS101");
    assert_eq!(course.credits().value(), 3);
}

#[tokio::test]
async fn create_duplicate_is_conflict() {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_insert()
        .return_once(|_| Err(CourseRepositoryError::duplicate("CS101")));

    let error = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .create(course_draft())
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn get_resolves_students_in_registration_order() {
    let ada = student("Ada Lovelace", "ada@example.com");
    let alan = student("Alan Turing", "alan@example.com");
    let ghost = UserId::random();
    let course = Course::restore(
        CourseId::random(),
        course_draft(),
        vec![alan.id(), ghost, ada.id()],
    );
    let id = course.id();

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut users = MockUserRepository::new();
    let found = vec![ada.clone(), alan.clone()];
    users
        .expect_find_by_ids()
        .withf(|ids| ids.len() == 3)
        .return_once(move |_| Ok(found));

    let detail = make_service(courses, users, MockResultRepository::new())
        .get(id)
        .await
        .expect("detail");

    let names: Vec<&str> = detail
        .registered_students
        .iter()
        .map(|summary| summary.name.as_ref())
        .collect();
    assert_eq!(names, vec!["Alan Turing", "Ada Lovelace"]);
    assert_eq!(detail.course.id, id);
}

#[tokio::test]
async fn get_missing_course_is_not_found() {
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .get(CourseId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn register_adds_a_single_roster_entry() {
    let course = Course::from_draft(CourseId::random(), course_draft());
    let id = course.id();
    let student_id = UserId::random();
    let registered = Course::restore(id, course_draft(), vec![student_id]);

    let mut courses = MockCourseRepository::new();
    let mut lookups = mockall::Sequence::new();
    courses
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut lookups)
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_add_registration()
        .withf(move |course, student| *course == id && *student == student_id)
        .times(1)
        .in_sequence(&mut lookups)
        .return_once(|_, _| Ok(()));
    courses
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut lookups)
        .return_once(move |_| Ok(Some(registered)));
    courses.expect_update().never();

    let course = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .register(id, student_id)
        .await
        .expect("registered");

    assert!(course.is_registered(student_id));
}

#[tokio::test]
async fn register_twice_is_invalid_request() {
    let student_id = UserId::random();
    let course = Course::restore(CourseId::random(), course_draft(), vec![student_id]);
    let id = course.id();

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_add_registration()
        .return_once(|_, _| Err(CourseRepositoryError::already_registered()));

    let error = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .register(id, student_id)
        .await
        .expect_err("already registered");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "already registered for this course");
}

#[tokio::test]
async fn register_for_missing_course_is_not_found() {
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().return_once(|_| Ok(None));
    courses.expect_add_registration().never();

    let error = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .register(CourseId::random(), UserId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unregister_when_not_registered_is_invalid_request() {
    let course = Course::from_draft(CourseId::random(), course_draft());
    let id = course.id();

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_remove_registration()
        .return_once(|_, _| Err(CourseRepositoryError::not_registered()));

    let error = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .unregister(id, UserId::random())
        .await
        .expect_err("not registered");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "not registered for this course");
}

#[tokio::test]
async fn delete_cascades_course_results() {
    let course = Course::from_draft(CourseId::random(), course_draft());
    let id = course.id();

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses.expect_delete().times(1).return_once(|_| Ok(true));
    let mut results = MockResultRepository::new();
    results
        .expect_delete_for_course()
        .withf(move |course| *course == id)
        .times(1)
        .return_once(|_| Ok(4));

    make_service(courses, MockUserRepository::new(), results)
        .delete(id)
        .await
        .expect("deleted");
}

#[tokio::test]
async fn update_applies_partial_changes() {
    let course = Course::from_draft(CourseId::random(), course_draft());
    let id = course.id();

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses.expect_update().times(1).return_once(|_| Ok(()));

    let changes = CourseChanges {
        credits: Some(Credits::new(4).expect("credits")),
        ..CourseChanges::default()
    };
    let course = make_service(courses, MockUserRepository::new(), MockResultRepository::new())
        .update(id, changes)
        .await
        .expect("updated");

    assert_eq!(course.credits().value(), 4);
    assert_eq!(course.code().as_ref(), "CS101");
}

mod concurrent_roster_changes {
    //! Roster changes racing each other over the in-memory adapter.
    //!
    //! Every lookup yields before answering, so joined calls interleave the
    //! way they would against a database.

    use super::*;
    use async_trait::async_trait;
    use crate::domain::ports::CourseRepository;
    use crate::outbound::memory::{
        MemoryCourseRepository, MemoryResultRepository, MemoryUserRepository,
    };

    struct YieldingCourses(MemoryCourseRepository);

    #[async_trait]
    impl CourseRepository for YieldingCourses {
        async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
            self.0.insert(course).await
        }

        async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError> {
            self.0.update(course).await
        }

        async fn add_registration(
            &self,
            course: CourseId,
            student: UserId,
        ) -> Result<(), CourseRepositoryError> {
            self.0.add_registration(course, student).await
        }

        async fn remove_registration(
            &self,
            course: CourseId,
            student: UserId,
        ) -> Result<(), CourseRepositoryError> {
            self.0.remove_registration(course, student).await
        }

        async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
            tokio::task::yield_now().await;
            self.0.find_by_id(id).await
        }

        async fn find_by_ids(
            &self,
            ids: &[CourseId],
        ) -> Result<Vec<Course>, CourseRepositoryError> {
            self.0.find_by_ids(ids).await
        }

        async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
            self.0.list().await
        }

        async fn delete(&self, id: CourseId) -> Result<bool, CourseRepositoryError> {
            self.0.delete(id).await
        }

        async fn remove_student(&self, student: UserId) -> Result<(), CourseRepositoryError> {
            self.0.remove_student(student).await
        }
    }

    type RacingService =
        CatalogueService<YieldingCourses, MemoryUserRepository, MemoryResultRepository>;

    async fn racing_service() -> (RacingService, CourseId) {
        let service = CatalogueService::new(
            Arc::new(YieldingCourses(MemoryCourseRepository::new())),
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryResultRepository::new()),
        );
        let course = service.create(course_draft()).await.expect("create course");
        (service, course.id())
    }

    #[tokio::test]
    async fn simultaneous_registrations_are_both_kept() {
        let (service, id) = racing_service().await;
        let ada = UserId::random();
        let alan = UserId::random();

        let (first, second) = tokio::join!(service.register(id, ada), service.register(id, alan));
        first.expect("ada registered");
        second.expect("alan registered");

        let stored = service.require_course(id).await.expect("course");
        assert_eq!(stored.registered_students(), [ada, alan]);
    }

    #[tokio::test]
    async fn course_edit_racing_a_registration_keeps_the_roster() {
        let (service, id) = racing_service().await;
        let ada = UserId::random();
        let changes = CourseChanges {
            credits: Some(Credits::new(4).expect("credits")),
            ..CourseChanges::default()
        };

        let (registered, edited) =
            tokio::join!(service.register(id, ada), service.update(id, changes));
        edited.expect("course edited");
        registered.expect("ada registered");

        let stored = service.require_course(id).await.expect("course");
        assert_eq!(stored.credits().value(), 4);
        assert_eq!(stored.registered_students(), [ada]);
    }
}
