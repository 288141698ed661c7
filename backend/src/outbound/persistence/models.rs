//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{course_registrations, courses, results, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i16>,
}

/// Account row joined with its stored password, used for login only.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserCredentialRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
    pub student_id: Option<&'a str>,
    pub department: Option<&'a str>,
    pub semester: Option<i16>,
}

/// Profile changeset. `None` optionals are written as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub student_id: Option<&'a str>,
    pub department: Option<&'a str>,
    pub semester: Option<i16>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub course_code: &'a str,
    pub course_name: &'a str,
    pub credits: i32,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseUpdate<'a> {
    pub course_code: &'a str,
    pub course_name: &'a str,
    pub credits: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub course_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = course_registrations)]
pub(crate) struct NewRegistrationRow {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResultRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub score: i16,
    pub date_achieved: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = results)]
pub(crate) struct NewResultRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub score: i16,
    pub grade: &'a str,
    pub grade_point: f64,
    pub date_achieved: Option<DateTime<Utc>>,
}

/// Score changeset. Grade columns always travel with the score.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = results)]
pub(crate) struct ResultUpdate<'a> {
    pub score: i16,
    pub grade: &'a str,
    pub grade_point: f64,
    pub date_achieved: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
