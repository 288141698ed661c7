//! Authentication primitives: credentials, passwords, and the requester.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Role, UserId, UserValidationError};

/// Minimum accepted length for a new password.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login or password values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Plain-text password held in zeroizing memory until it is hashed.
///
/// Whitespace is preserved so the comparison at login matches exactly what
/// the user typed at registration.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Accept any non-empty password. Used at login where legacy accounts
    /// may predate the length rule.
    pub fn new(value: &str) -> Result<Self, LoginValidationError> {
        if value.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(value.to_owned())))
    }

    /// Accept a password chosen at registration or profile update.
    pub fn new_secret(value: &str) -> Result<Self, LoginValidationError> {
        let password = Self::new(value)?;
        if value.chars().count() < PASSWORD_MIN {
            return Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(password)
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(**redacted**)")
    }
}

/// Password as persisted: normally a PHC-format hash string.
///
/// Accounts created before hashing was introduced may still hold plain text
/// until the `migrate-passwords` tool rewrites them.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredPassword(String);

impl StoredPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoredPassword(**redacted**)")
    }
}

/// Validated login credentials used by the account service.
///
/// # Examples
/// ```
/// use portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|err| match err {
            UserValidationError::EmptyEmail => LoginValidationError::EmptyEmail,
            _ => LoginValidationError::InvalidEmail,
        })?;
        let password = PlainPassword::new(password)?;
        Ok(Self { email, password })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// The authenticated caller of an operation.
///
/// Handlers resolve this from the session and pass it explicitly to every
/// service call that needs authorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    id: UserId,
    role: Role,
}

impl Requester {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Administrators may view anyone's results; students only their own.
    pub fn may_view_student(&self, student: UserId) -> bool {
        self.is_admin() || self.id == student
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("nobody", "pw", LoginValidationError::InvalidEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pass ")
            .expect("valid credentials");
        assert_eq!(creds.password().expose(), " pass ");
    }

    #[rstest]
    fn new_secret_enforces_minimum_length() {
        assert_eq!(
            PlainPassword::new_secret("abc"),
            Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN })
        );
        assert!(PlainPassword::new_secret("abcdef").is_ok());
    }

    #[rstest]
    fn debug_output_redacts_passwords() {
        let plain = PlainPassword::new("hunter22").expect("password");
        let stored = StoredPassword::new("$argon2id$...");
        assert!(!format!("{plain:?}").contains("hunter22"));
        assert!(!format!("{stored:?}").contains("argon2"));
    }

    #[rstest]
    #[case(Role::Admin, false, true)]
    #[case(Role::Student, true, true)]
    #[case(Role::Student, false, false)]
    fn view_permissions(#[case] role: Role, #[case] is_self: bool, #[case] allowed: bool) {
        let me = UserId::random();
        let requester = Requester::new(me, role);
        let target = if is_self { me } else { UserId::random() };
        assert_eq!(requester.may_view_student(target), allowed);
    }
}
