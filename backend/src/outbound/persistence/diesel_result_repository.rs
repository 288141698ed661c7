//! PostgreSQL-backed `ResultRepository` implementation using Diesel ORM.
//!
//! The `grade` and `grade_point` columns are written from the domain result
//! for reporting queries, but reads always re-derive them from `score`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ResultRepository, ResultRepositoryError};
use crate::domain::{CourseId, CourseResult, ResultId, Score, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_unique_diesel_error,
};
use super::models::{NewResultRow, ResultRow, ResultUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::results;

/// Diesel-backed implementation of the result repository port.
#[derive(Clone)]
pub struct DieselResultRepository {
    pool: DbPool,
}

impl DieselResultRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ResultRepositoryError {
    map_basic_pool_error(error, ResultRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ResultRepositoryError {
    map_basic_diesel_error(
        error,
        ResultRepositoryError::query,
        ResultRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error) -> ResultRepositoryError {
    map_unique_diesel_error(
        error,
        ResultRepositoryError::query,
        ResultRepositoryError::connection,
        ResultRepositoryError::duplicate,
    )
}

/// Convert a database row into a domain result.
///
/// Rows that predate mandatory dates fall back to `created_at`.
fn row_to_result(row: ResultRow) -> Result<CourseResult, ResultRepositoryError> {
    let score = Score::new(i64::from(row.score))
        .map_err(|err| ResultRepositoryError::query(format!("stored result is invalid: {err}")))?;
    let date_achieved = row.date_achieved.unwrap_or_else(|| {
        warn!(result_id = %row.id, "result has no achievement date; using creation time");
        row.created_at
    });
    Ok(CourseResult::restore(
        ResultId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        CourseId::from_uuid(row.course_id),
        score,
        date_achieved,
    ))
}

fn rows_to_results(rows: Vec<ResultRow>) -> Result<Vec<CourseResult>, ResultRepositoryError> {
    rows.into_iter().map(row_to_result).collect()
}

fn score_column(result: &CourseResult) -> i16 {
    i16::from(result.score().value())
}

#[async_trait]
impl ResultRepository for DieselResultRepository {
    async fn insert(&self, result: &CourseResult) -> Result<(), ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewResultRow {
            id: *result.id().as_uuid(),
            user_id: *result.student_id().as_uuid(),
            course_id: *result.course_id().as_uuid(),
            score: score_column(result),
            grade: result.grade().as_str(),
            grade_point: result.grade_point().as_f64(),
            date_achieved: Some(result.date_achieved()),
        };
        diesel::insert_into(results::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error)
    }

    async fn update(&self, result: &CourseResult) -> Result<(), ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ResultUpdate {
            score: score_column(result),
            grade: result.grade().as_str(),
            grade_point: result.grade_point().as_f64(),
            date_achieved: Some(result.date_achieved()),
            updated_at: Utc::now(),
        };
        let updated = diesel::update(results::table.find(result.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ResultRepositoryError::query("result not found for update"));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ResultId) -> Result<Option<CourseResult>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResultRow> = results::table
            .find(id.as_uuid())
            .select(ResultRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_result).transpose()
    }

    async fn find_for_student_and_course(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Option<CourseResult>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResultRow> = results::table
            .filter(results::user_id.eq(student.as_uuid()))
            .filter(results::course_id.eq(course.as_uuid()))
            .select(ResultRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_result).transpose()
    }

    async fn list_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResultRow> = results::table
            .filter(results::user_id.eq(student.as_uuid()))
            .order(results::date_achieved.desc().nulls_last())
            .select(ResultRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_results(rows)
    }

    async fn list_for_course(
        &self,
        course: CourseId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResultRow> = results::table
            .filter(results::course_id.eq(course.as_uuid()))
            .order(results::user_id.asc())
            .select(ResultRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_results(rows)
    }

    async fn list_all(&self) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResultRow> = results::table
            .order(results::date_achieved.desc().nulls_last())
            .select(ResultRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_results(rows)
    }

    async fn delete(&self, id: ResultId) -> Result<bool, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(results::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_for_student(&self, student: UserId) -> Result<usize, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(results::table.filter(results::user_id.eq(student.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn delete_for_course(&self, course: CourseId) -> Result<usize, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(results::table.filter(results::course_id.eq(course.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn backfill_missing_dates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(results::table.filter(results::date_achieved.is_null()))
            .set((
                results::date_achieved.eq(Some(now)),
                results::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
