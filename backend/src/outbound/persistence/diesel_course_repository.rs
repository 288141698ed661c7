//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.
//!
//! A course's roster lives in `course_registrations`, ordered by `position`.
//! Each registration is its own row keyed by `(course_id, user_id)`, so roster
//! changes insert or delete one row and course edits never touch the roster.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{
    Course, CourseCode, CourseDraft, CourseId, CourseName, CourseValidationError, Credits, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_unique_diesel_error,
};
use super::models::{CourseRow, CourseUpdate, NewCourseRow, NewRegistrationRow, RegistrationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{course_registrations, courses};

/// Diesel-backed implementation of the course repository port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    map_basic_pool_error(error, CourseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_basic_diesel_error(
        error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_unique_diesel_error(
        error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
        CourseRepositoryError::duplicate,
    )
}

/// Registration writes: a repeated pair is already registered, and a
/// vanished course surfaces as a foreign-key violation.
fn map_registration_error(error: diesel::result::Error) -> CourseRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            CourseRepositoryError::already_registered()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            CourseRepositoryError::course_missing()
        }
        other => map_diesel_error(other),
    }
}

/// Position after the highest one on the roster, or 0 for an empty roster.
fn next_position(last: Option<i32>) -> Result<i32, CourseRepositoryError> {
    match last {
        None => Ok(0),
        Some(last) => last
            .checked_add(1)
            .ok_or_else(|| CourseRepositoryError::query("roster positions exhausted")),
    }
}

fn credits_column(course: &Course) -> Result<i32, CourseRepositoryError> {
    i32::try_from(course.credits().value())
        .map_err(|err| CourseRepositoryError::query(format!("credits out of range: {err}")))
}

fn registration_rows(course: &Course) -> Result<Vec<NewRegistrationRow>, CourseRepositoryError> {
    course
        .registered_students()
        .iter()
        .enumerate()
        .map(|(index, student)| {
            let position = i32::try_from(index).map_err(|err| {
                CourseRepositoryError::query(format!("roster too large: {err}"))
            })?;
            Ok(NewRegistrationRow {
                course_id: *course.id().as_uuid(),
                user_id: *student.as_uuid(),
                position,
            })
        })
        .collect()
}

fn corrupt(error: CourseValidationError) -> CourseRepositoryError {
    CourseRepositoryError::query(format!("stored course is invalid: {error}"))
}

/// Convert a course row and its ordered roster into a domain course.
fn row_to_course(row: CourseRow, roster: Vec<UserId>) -> Result<Course, CourseRepositoryError> {
    let draft = CourseDraft {
        code: CourseCode::new(row.course_code).map_err(corrupt)?,
        name: CourseName::new(row.course_name).map_err(corrupt)?,
        credits: Credits::new(i64::from(row.credits)).map_err(corrupt)?,
    };
    Ok(Course::restore(CourseId::from_uuid(row.id), draft, roster))
}

impl DieselCourseRepository {
    /// Load rosters for the given courses, keyed by course id.
    async fn load_rosters(
        conn: &mut diesel_async::AsyncPgConnection,
        course_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<UserId>>, CourseRepositoryError> {
        let rows: Vec<RegistrationRow> = course_registrations::table
            .filter(course_registrations::course_id.eq_any(course_ids.to_vec()))
            .order((
                course_registrations::course_id.asc(),
                course_registrations::position.asc(),
                course_registrations::registered_at.asc(),
            ))
            .select(RegistrationRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        let mut rosters: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for row in rows {
            rosters
                .entry(row.course_id)
                .or_default()
                .push(UserId::from_uuid(row.user_id));
        }
        Ok(rosters)
    }

    async fn load_courses(
        conn: &mut diesel_async::AsyncPgConnection,
        rows: Vec<CourseRow>,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut rosters = Self::load_rosters(conn, &ids).await?;
        rows.into_iter()
            .map(|row| {
                let roster = rosters.remove(&row.id).unwrap_or_default();
                row_to_course(row, roster)
            })
            .collect()
    }
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = NewCourseRow {
            id: *course.id().as_uuid(),
            course_code: course.code().as_ref(),
            course_name: course.name().as_ref(),
            credits: credits_column(course)?,
        };
        let roster = registration_rows(course)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(courses::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !roster.is_empty() {
                    diesel::insert_into(course_registrations::table)
                        .values(&roster)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let changes = CourseUpdate {
            course_code: course.code().as_ref(),
            course_name: course.name().as_ref(),
            credits: credits_column(course)?,
            updated_at: Utc::now(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(courses::table.find(course.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_write_error)?;
        if updated == 0 {
            return Err(CourseRepositoryError::query("course not found for update"));
        }
        Ok(())
    }

    async fn add_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError> {
        let course_id = *course.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let exists: bool = diesel::select(diesel::dsl::exists(courses::table.find(course_id)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if !exists {
            return Err(CourseRepositoryError::course_missing());
        }

        let last: Option<i32> = course_registrations::table
            .filter(course_registrations::course_id.eq(course_id))
            .select(diesel::dsl::max(course_registrations::position))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        // Racing inserts may share a position; reads break ties by time.
        let row = NewRegistrationRow {
            course_id,
            user_id: *student.as_uuid(),
            position: next_position(last)?,
        };
        diesel::insert_into(course_registrations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_registration_error)
    }

    async fn remove_registration(
        &self,
        course: CourseId,
        student: UserId,
    ) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            course_registrations::table
                .filter(course_registrations::course_id.eq(course.as_uuid()))
                .filter(course_registrations::user_id.eq(student.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(CourseRepositoryError::not_registered());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .find(id.as_uuid())
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut courses = Self::load_courses(&mut conn, vec![row]).await?;
        Ok(courses.pop())
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::id.eq_any(uuids))
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Self::load_courses(&mut conn, rows).await
    }

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .order(courses::course_code.asc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Self::load_courses(&mut conn, rows).await
    }

    async fn delete(&self, id: CourseId) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Registrations go with the course through ON DELETE CASCADE.
        let deleted = diesel::delete(courses::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn remove_student(&self, student: UserId) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            course_registrations::table.filter(course_registrations::user_id.eq(student.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }
}
