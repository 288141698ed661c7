//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use mockable::DefaultClock;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::{
    EmailAddress, PersonName, PlainPassword, Role, User, UserDraft, UserId,
};
use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::memory::{
    MemoryCourseRepository, MemoryResultRepository, MemoryUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set on a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// In-memory adapters plus the state wired over them.
pub struct MemoryHarness {
    pub state: HttpState,
    pub users: Arc<MemoryUserRepository>,
    pub hasher: Arc<Argon2PasswordHasher>,
}

impl Default for MemoryHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHarness {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let hasher = Arc::new(Argon2PasswordHasher::new());
        let state = HttpState::from_repositories(
            Repositories {
                users: users.clone(),
                courses: Arc::new(MemoryCourseRepository::new()),
                results: Arc::new(MemoryResultRepository::new()),
            },
            hasher.clone(),
            Arc::new(DefaultClock),
        );
        Self {
            state,
            users,
            hasher,
        }
    }

    /// Insert an admin directly, bypassing the public registration rules.
    pub async fn seed_admin(&self, email: &str, password: &str) -> User {
        let user = User::from_draft(
            UserId::random(),
            UserDraft {
                name: PersonName::new("Portal Admin").expect("admin name"),
                email: EmailAddress::new(email).expect("admin email"),
                role: Role::Admin,
                student_id: None,
                department: None,
                semester: None,
            },
        );
        let stored = self
            .hasher
            .hash(&PlainPassword::new(password).expect("admin password"))
            .expect("hash admin password");
        self.users
            .insert(&user, &stored)
            .await
            .expect("insert admin");
        user
    }
}
