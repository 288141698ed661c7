//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted through the validated domain constructors, so a
//! corrupted row surfaces as a query error rather than an invalid `User`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserCredentialRecord, UserPersistenceError, UserRepository};
use crate::domain::{
    Department, EmailAddress, PersonName, Role, Semester, StoredPassword, StudentNumber, User,
    UserDraft, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_unique_diesel_error,
};
use super::models::{NewUserRow, UserCredentialRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, email: &EmailAddress) -> UserPersistenceError {
    map_unique_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
        |_| UserPersistenceError::duplicate_email(email.as_ref()),
    )
}

fn corrupt(field: &str, error: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user has invalid {field}: {error}"))
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        role,
        student_id,
        department,
        semester,
    } = row;

    let draft = UserDraft {
        name: PersonName::new(name).map_err(|err| corrupt("name", err))?,
        email: EmailAddress::new(email).map_err(|err| corrupt("email", err))?,
        role: role.parse::<Role>().map_err(|err| corrupt("role", err))?,
        student_id: student_id
            .map(StudentNumber::new)
            .transpose()
            .map_err(|err| corrupt("student id", err))?,
        department: department
            .map(Department::new)
            .transpose()
            .map_err(|err| corrupt("department", err))?,
        semester: semester
            .map(|value| Semester::new(i64::from(value)))
            .transpose()
            .map_err(|err| corrupt("semester", err))?,
    };
    Ok(User::from_draft(UserId::from_uuid(id), draft))
}

fn semester_column(user: &User) -> Option<i16> {
    user.semester().map(|semester| i16::from(semester.value()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password: password.as_str(),
            role: user.role().as_str(),
            student_id: user.student_id().map(AsRef::as_ref),
            department: user.department().map(AsRef::as_ref),
            semester: semester_column(user),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user.email()))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserUpdate {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            role: user.role().as_str(),
            student_id: user.student_id().map(AsRef::as_ref),
            department: user.department().map(AsRef::as_ref),
            semester: semester_column(user),
            updated_at: Utc::now(),
        };

        let updated = diesel::update(users::table.find(user.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user.email()))?;
        if updated == 0 {
            return Err(UserPersistenceError::query("user not found for update"));
        }
        Ok(())
    }

    async fn set_password(
        &self,
        id: UserId,
        password: &StoredPassword,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::password.eq(password.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, StoredPassword)>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserCredentialRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserCredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Ok((row_to_user(row.user)?, StoredPassword::new(row.password))))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn list_credentials(&self) -> Result<Vec<UserCredentialRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(uuid::Uuid, String)> = users::table
            .order(users::created_at.asc())
            .select((users::id, users::password))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, password)| UserCredentialRecord {
                id: UserId::from_uuid(id),
                password: StoredPassword::new(password),
            })
            .collect())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
