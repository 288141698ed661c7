//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format, so the algorithm, parameters and
//! salt travel with each hash.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PlainPassword, StoredPassword};

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<StoredPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| StoredPassword::new(hash.to_string()))
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &PlainPassword, stored: &StoredPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(stored.as_str()) else {
            return false;
        };
        self.argon2
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }

    fn is_hashed(&self, stored: &StoredPassword) -> bool {
        PasswordHash::new(stored.as_str())
            .is_ok_and(|hash| hash.algorithm.as_str().starts_with("argon2"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    fn password(value: &str) -> PlainPassword {
        PlainPassword::new(value).expect("valid password")
    }

    #[rstest]
    fn hash_verifies_the_original_password(hasher: Argon2PasswordHasher) {
        let stored = hasher.hash(&password("correct horse")).expect("hash");
        assert!(stored.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password("correct horse"), &stored));
        assert!(!hasher.verify(&password("battery staple"), &stored));
    }

    #[rstest]
    fn hashing_salts_each_password(hasher: Argon2PasswordHasher) {
        let first = hasher.hash(&password("correct horse")).expect("hash");
        let second = hasher.hash(&password("correct horse")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case::plaintext("correct horse", false)]
    #[case::empty("", false)]
    #[case::foreign_phc("$pbkdf2-sha256$i=1000$c2FsdA$aGFzaA", false)]
    fn plaintext_is_not_treated_as_a_hash(
        hasher: Argon2PasswordHasher,
        #[case] stored: &str,
        #[case] expected: bool,
    ) {
        let stored = StoredPassword::new(stored);
        assert_eq!(hasher.is_hashed(&stored), expected);
        assert!(!hasher.verify(&password("correct horse"), &stored));
    }

    #[rstest]
    fn fresh_hashes_are_recognised(hasher: Argon2PasswordHasher) {
        let stored = hasher.hash(&password("correct horse")).expect("hash");
        assert!(hasher.is_hashed(&stored));
    }
}
