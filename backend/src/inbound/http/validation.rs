//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` error whose
//! `details` carry the offending JSON field, a stable machine code and, where
//! it is safe to echo, the rejected value.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    CourseId, CourseValidationError, Error, LoginValidationError, ResultId, ScoreValidationError,
    UserId, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    EmptyValue,
    TooLong,
    InvalidEmail,
    OutOfRange,
    UnknownRole,
    PasswordTooShort,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::EmptyValue => "empty_value",
            Self::TooLong => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::OutOfRange => "out_of_range",
            Self::UnknownRole => "unknown_role",
            Self::PasswordTooShort => "password_too_short",
        }
    }
}

/// JSON field name as clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_error_with_value(
    field: FieldName,
    code: ValidationCode,
    message: impl Into<String>,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    field_error_with_value(
        field,
        ValidationCode::InvalidUuid,
        format!("{} must be a valid UUID", field.as_str()),
        value,
    )
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_course_id(value: &str, field: FieldName) -> Result<CourseId, Error> {
    CourseId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_result_id(value: &str, field: FieldName) -> Result<ResultId, Error> {
    ResultId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_error_with_value(
                field,
                ValidationCode::InvalidTimestamp,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Treat blank strings in partial updates as "keep the current value".
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

pub(crate) fn user_field_error(field: FieldName, error: UserValidationError) -> Error {
    let code = match error {
        UserValidationError::InvalidId => ValidationCode::InvalidUuid,
        UserValidationError::EmptyName
        | UserValidationError::EmptyEmail
        | UserValidationError::EmptyStudentNumber
        | UserValidationError::EmptyDepartment => ValidationCode::EmptyValue,
        UserValidationError::NameTooLong { .. } => ValidationCode::TooLong,
        UserValidationError::InvalidEmail => ValidationCode::InvalidEmail,
        UserValidationError::SemesterOutOfRange { .. } => ValidationCode::OutOfRange,
        UserValidationError::UnknownRole => ValidationCode::UnknownRole,
    };
    field_error(field, code, error.to_string())
}

pub(crate) fn course_field_error(field: FieldName, error: CourseValidationError) -> Error {
    let code = match error {
        CourseValidationError::InvalidId => ValidationCode::InvalidUuid,
        CourseValidationError::EmptyCode | CourseValidationError::EmptyName => {
            ValidationCode::EmptyValue
        }
        CourseValidationError::CreditsTooLow { .. } | CourseValidationError::CreditsTooHigh { .. } => {
            ValidationCode::OutOfRange
        }
    };
    field_error(field, code, error.to_string())
}

pub(crate) fn score_field_error(field: FieldName, error: ScoreValidationError) -> Error {
    field_error(field, ValidationCode::OutOfRange, error.to_string())
}

/// Map credential validation onto the `email` or `password` field.
pub(crate) fn login_field_error(error: LoginValidationError) -> Error {
    let (field, code) = match error {
        LoginValidationError::EmptyEmail => (FieldName::new("email"), ValidationCode::EmptyValue),
        LoginValidationError::InvalidEmail => {
            (FieldName::new("email"), ValidationCode::InvalidEmail)
        }
        LoginValidationError::EmptyPassword => {
            (FieldName::new("password"), ValidationCode::EmptyValue)
        }
        LoginValidationError::PasswordTooShort { .. } => {
            (FieldName::new("password"), ValidationCode::PasswordTooShort)
        }
    };
    field_error(field, code, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const SCORE: FieldName = FieldName::new("score");
    const USER_ID: FieldName = FieldName::new("userId");

    #[rstest]
    fn invalid_uuid_echoes_the_value() {
        let error = parse_user_id("nope", USER_ID).expect_err("invalid uuid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({"field": "userId", "value": "nope", "code": "invalid_uuid"}))
        );
    }

    #[rstest]
    #[case::blank(Some("   ".to_owned()), None)]
    #[case::absent(None, None)]
    #[case::present(Some("Physics".to_owned()), Some("Physics"))]
    fn blank_partial_fields_are_ignored(
        #[case] input: Option<String>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(non_blank(input).as_deref(), expected);
    }

    #[rstest]
    fn score_errors_name_the_field() {
        let error = score_field_error(SCORE, ScoreValidationError::OutOfRange { value: 120 });
        assert_eq!(error.message(), "score must be between 0 and 100, got 120");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "score", "code": "out_of_range"}))
        );
    }

    #[rstest]
    #[case::empty_password(LoginValidationError::EmptyPassword, "password", "empty_value")]
    #[case::short_password(
        LoginValidationError::PasswordTooShort { min: 6 },
        "password",
        "password_too_short"
    )]
    #[case::bad_email(LoginValidationError::InvalidEmail, "email", "invalid_email")]
    fn login_errors_map_to_fields(
        #[case] error: LoginValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = login_field_error(error);
        assert_eq!(mapped.details(), Some(&json!({"field": field, "code": code})));
    }

    #[rstest]
    fn timestamps_must_be_rfc3339() {
        let field = FieldName::new("dateAchieved");
        assert!(parse_optional_rfc3339_timestamp(None, field)
            .expect("absent is fine")
            .is_none());
        let parsed = parse_rfc3339_timestamp("2024-05-01T09:00:00+02:00", field).expect("valid");
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T07:00:00+00:00");
        assert!(parse_rfc3339_timestamp("yesterday", field).is_err());
    }
}
