//! Courses and their student registrations.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StudentSummary, UserId};

/// Validation errors raised by course field constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("course id must be a valid UUID")]
    InvalidId,
    #[error("course code must not be empty")]
    EmptyCode,
    #[error("course name must not be empty")]
    EmptyName,
    #[error("credits must be at least 1, got {value}")]
    CreditsTooLow { value: i64 },
    #[error("credits must be at most {max}, got {value}")]
    CreditsTooHigh { value: i64, max: u32 },
}

/// Errors raised when changing a course's registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("already registered for this course")]
    AlreadyRegistered,
    #[error("not registered for this course")]
    NotRegistered,
}

/// Stable course identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(Uuid);

impl CourseId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| CourseValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for CourseId {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique course code such as `"CS101"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(value: impl Into<String>) -> Result<Self, CourseValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CourseValidationError::EmptyCode);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Unique human-readable course name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseName(String);

impl CourseName {
    pub fn new(value: impl Into<String>) -> Result<Self, CourseValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CourseValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

macro_rules! string_newtype_conversions {
    ($($name:ident),*) => {
        $(
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
                type Error = CourseValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

string_newtype_conversions!(CourseCode, CourseName);

/// Credit weight of a course, at least 1.
///
/// # Examples
/// ```
/// use portal::domain::Credits;
///
/// assert_eq!(Credits::new(3).expect("valid credits").value(), 3);
/// assert!(Credits::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Credits(u32);

impl Credits {
    /// Upper bound that keeps credit arithmetic comfortably inside `i32`.
    pub const MAX: u32 = 1_000;

    pub fn new(value: i64) -> Result<Self, CourseValidationError> {
        if value < 1 {
            return Err(CourseValidationError::CreditsTooLow { value });
        }
        u32::try_from(value)
            .ok()
            .filter(|raw| *raw <= Self::MAX)
            .map(Self)
            .ok_or(CourseValidationError::CreditsTooHigh {
                value,
                max: Self::MAX,
            })
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Credits {
    type Error = CourseValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credits> for u32 {
    fn from(value: Credits) -> Self {
        value.0
    }
}

/// A course offered by the institution.
///
/// ## Invariants
/// - `registered_students` never contains the same student twice and keeps
///   registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[schema(value_type = String)]
    id: CourseId,
    #[schema(value_type = String, example = "CS101")]
    course_code: CourseCode,
    #[schema(value_type = String, example = "Introduction to Programming")]
    course_name: CourseName,
    #[schema(value_type = u32, example = 3)]
    credits: Credits,
    #[schema(value_type = Vec<String>)]
    registered_students: Vec<UserId>,
}

/// Fields needed to create a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub code: CourseCode,
    pub name: CourseName,
    pub credits: Credits,
}

/// Partial course update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub code: Option<CourseCode>,
    pub name: Option<CourseName>,
    pub credits: Option<Credits>,
}

impl Course {
    /// Create a course with no registrations.
    pub fn from_draft(id: CourseId, draft: CourseDraft) -> Self {
        Self {
            id,
            course_code: draft.code,
            course_name: draft.name,
            credits: draft.credits,
            registered_students: Vec::new(),
        }
    }

    /// Rebuild a course from stored parts, dropping duplicate registrations.
    pub fn restore(id: CourseId, draft: CourseDraft, registered: Vec<UserId>) -> Self {
        let mut course = Self::from_draft(id, draft);
        for student in registered {
            // Duplicates in storage are ignored rather than surfaced.
            let _ = course.register(student);
        }
        course
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    pub fn code(&self) -> &CourseCode {
        &self.course_code
    }

    pub fn name(&self) -> &CourseName {
        &self.course_name
    }

    pub fn credits(&self) -> Credits {
        self.credits
    }

    pub fn registered_students(&self) -> &[UserId] {
        &self.registered_students
    }

    pub fn is_registered(&self, student: UserId) -> bool {
        self.registered_students.contains(&student)
    }

    /// Append a student to the registration list.
    pub fn register(&mut self, student: UserId) -> Result<(), RegistrationError> {
        if self.is_registered(student) {
            return Err(RegistrationError::AlreadyRegistered);
        }
        self.registered_students.push(student);
        Ok(())
    }

    /// Remove a student from the registration list.
    pub fn drop_student(&mut self, student: UserId) -> Result<(), RegistrationError> {
        let before = self.registered_students.len();
        self.registered_students.retain(|id| *id != student);
        if self.registered_students.len() == before {
            return Err(RegistrationError::NotRegistered);
        }
        Ok(())
    }

    /// Apply a partial update, keeping fields the caller left out.
    #[must_use]
    pub fn apply(mut self, changes: CourseChanges) -> Self {
        if let Some(code) = changes.code {
            self.course_code = code;
        }
        if let Some(name) = changes.name {
            self.course_name = name;
        }
        if let Some(credits) = changes.credits {
            self.credits = credits;
        }
        self
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            course_code: self.course_code.clone(),
            course_name: self.course_name.clone(),
            credits: self.credits,
        }
    }
}

/// Compact view of a course embedded in result payloads and used when
/// folding transcripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[schema(value_type = String)]
    pub id: CourseId,
    #[schema(value_type = String)]
    pub course_code: CourseCode,
    #[schema(value_type = String)]
    pub course_name: CourseName,
    #[schema(value_type = u32)]
    pub credits: Credits,
}

/// A course with its registered students resolved for display.
///
/// Students that no longer exist are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub registered_students: Vec<StudentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn course() -> Course {
        Course::from_draft(
            CourseId::random(),
            CourseDraft {
                code: CourseCode::new("CS101").expect("code"),
                name: CourseName::new("Introduction to Programming").expect("name"),
                credits: Credits::new(3).expect("credits"),
            },
        )
    }

    #[rstest]
    #[case(0, CourseValidationError::CreditsTooLow { value: 0 })]
    #[case(-4, CourseValidationError::CreditsTooLow { value: -4 })]
    #[case(1_001, CourseValidationError::CreditsTooHigh { value: 1_001, max: 1_000 })]
    fn credits_reject_out_of_range(#[case] raw: i64, #[case] expected: CourseValidationError) {
        assert_eq!(Credits::new(raw), Err(expected));
    }

    #[rstest]
    fn registration_preserves_order_and_uniqueness(mut course: Course) {
        let first = UserId::random();
        let second = UserId::random();
        course.register(first).expect("first registration");
        course.register(second).expect("second registration");
        assert_eq!(
            course.register(first),
            Err(RegistrationError::AlreadyRegistered)
        );
        assert_eq!(course.registered_students(), &[first, second]);
    }

    #[rstest]
    fn dropping_unknown_student_fails(mut course: Course) {
        assert_eq!(
            course.drop_student(UserId::random()),
            Err(RegistrationError::NotRegistered)
        );
    }

    #[rstest]
    fn restore_discards_duplicate_registrations(course: Course) {
        let student = UserId::random();
        let restored = Course::restore(
            course.id(),
            CourseDraft {
                code: course.code().clone(),
                name: course.name().clone(),
                credits: course.credits(),
            },
            vec![student, student],
        );
        assert_eq!(restored.registered_students(), &[student]);
    }

    #[rstest]
    fn serialises_with_camel_case_field_names(course: Course) {
        let value = serde_json::to_value(&course).expect("serialise course");
        assert_eq!(value["courseCode"], "CS101");
        assert_eq!(value["courseName"], "Introduction to Programming");
        assert_eq!(value["credits"], 3);
        assert!(value["registeredStudents"].as_array().is_some_and(Vec::is_empty));
    }
}
