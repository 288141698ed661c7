//! Portal user accounts.
//!
//! Users are either students, who register for courses and receive results,
//! or administrators, who manage courses and record results.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by user field constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("student id must not be empty")]
    EmptyStudentNumber,
    #[error("department must not be empty")]
    EmptyDepartment,
    #[error("semester must be between {min} and {max}")]
    SemesterOutOfRange { min: u8, max: u8 },
    #[error("role must be either student or admin")]
    UnknownRole,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role controlling which operations a user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Maximum allowed length for a person's name.
pub const PERSON_NAME_MAX: usize = 100;

macro_rules! trimmed_text {
    ($(#[$meta:meta])* $name:ident, $empty:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl $name {
            fn non_blank(value: String) -> Result<String, UserValidationError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err($empty);
                }
                Ok(trimmed.to_owned())
            }
        }
    };
}

trimmed_text!(
    /// A person's full name, trimmed and non-empty.
    PersonName,
    UserValidationError::EmptyName
);

impl PersonName {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = Self::non_blank(value.into())?;
        if name.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

trimmed_text!(
    /// Login email address, stored lower-cased.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    EmailAddress,
    UserValidationError::EmptyEmail
);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl EmailAddress {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = Self::non_blank(value.into())?.to_lowercase();
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

trimmed_text!(
    /// Institution-issued student number, e.g. `"CS2023001"`.
    StudentNumber,
    UserValidationError::EmptyStudentNumber
);

impl StudentNumber {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::non_blank(value.into()).map(Self)
    }
}

trimmed_text!(
    /// Academic department name.
    Department,
    UserValidationError::EmptyDepartment
);

impl Department {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::non_blank(value.into()).map(Self)
    }
}

/// Current semester of study, `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Semester(u8);

impl Semester {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(value: i64) -> Result<Self, UserValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|raw| (Self::MIN..=Self::MAX).contains(raw))
            .map(Self)
            .ok_or(UserValidationError::SemesterOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Semester {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> Self {
        value.0
    }
}

/// Registered portal user.
///
/// The stored password hash is deliberately not part of this type; it only
/// travels through the credential ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    name: PersonName,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "CS2023001")]
    student_id: Option<StudentNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "Computer Science")]
    department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u8>, example = 3)]
    semester: Option<Semester>,
}

/// Fields needed to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: PersonName,
    pub email: EmailAddress,
    pub role: Role,
    pub student_id: Option<StudentNumber>,
    pub department: Option<Department>,
    pub semester: Option<Semester>,
}

/// Partial profile update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<PersonName>,
    pub email: Option<EmailAddress>,
    pub student_id: Option<StudentNumber>,
    pub department: Option<Department>,
    pub semester: Option<Semester>,
}

impl User {
    /// Materialise a user from a draft and identifier.
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        let UserDraft {
            name,
            email,
            role,
            student_id,
            department,
            semester,
        } = draft;
        Self {
            id,
            name,
            email,
            role,
            student_id,
            department,
            semester,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn student_id(&self) -> Option<&StudentNumber> {
        self.student_id.as_ref()
    }

    pub fn department(&self) -> Option<&Department> {
        self.department.as_ref()
    }

    pub fn semester(&self) -> Option<Semester> {
        self.semester
    }

    /// Apply a partial update, keeping fields the caller left out.
    #[must_use]
    pub fn apply(mut self, changes: ProfileChanges) -> Self {
        let ProfileChanges {
            name,
            email,
            student_id,
            department,
            semester,
        } = changes;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if student_id.is_some() {
            self.student_id = student_id;
        }
        if department.is_some() {
            self.department = department;
        }
        if semester.is_some() {
            self.semester = semester;
        }
        self
    }
}

/// Compact view of a student embedded in course and result payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    #[schema(value_type = String)]
    pub id: UserId,
    #[schema(value_type = String)]
    pub name: PersonName,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub student_id: Option<StudentNumber>,
}

impl From<&User> for StudentSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            student_id: user.student_id.clone(),
        }
    }
}
