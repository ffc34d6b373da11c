use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::{AuthnError, AuthnService};

const PASSWORD_MIN_LENGTH: usize = 14;
const PASSWORD_MAX_LENGTH: usize = 72;

impl AuthnService {
    /// Returns true if the password meets the policy: length within bounds,
    /// at least one digit, one letter and one non-letter symbol. Pure.
    pub fn valid_password(&self, password: &str) -> bool {
        let length = password.chars().count();
        if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
            return false;
        }

        let mut digits = 0usize;
        let mut letters = 0usize;
        let mut symbols = 0usize;
        for c in password.chars() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c.is_alphabetic() {
                letters += 1;
            } else {
                symbols += 1;
            }
        }

        digits >= 1 && letters >= 1 && symbols >= 1
    }

    /// Hashes the password with Argon2id and a fresh random salt, returning
    /// the PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthnError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthnError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies the password against a stored PHC hash. A mismatch is
    /// `Ok(false)`; only a malformed hash or an internal failure is an error.
    pub fn check_password_hash(&self, password: &str, hash: &str) -> Result<bool, AuthnError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthnError::PasswordHashInvalid(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthnError::PasswordHashInvalid(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::AuthnService;

    fn service() -> AuthnService {
        AuthnService::with_fast_params(b"test-signing-key")
    }

    #[test]
    fn password_policy() {
        let s = service();

        assert!(s.valid_password("correct-horse-42"));
        assert!(s.valid_password("aaaaaaaaaaaaa1!"));

        // Too short.
        assert!(!s.valid_password("short1!"));
        // No digit.
        assert!(!s.valid_password("no-digits-here-at-all"));
        // No symbol.
        assert!(!s.valid_password("onlyletters12345"));
        // No letter.
        assert!(!s.valid_password("123456789012-#!"));
        // Too long.
        let long = format!("a1!{}", "a".repeat(80));
        assert!(!s.valid_password(&long));
    }

    #[test]
    fn hash_then_verify() {
        let s = service();
        let hash = s.hash_password("correct-horse-42").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(s.check_password_hash("correct-horse-42", &hash).unwrap());
        assert!(!s.check_password_hash("wrong-horse-42!", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let s = service();
        let first = s.hash_password("correct-horse-42").unwrap();
        let second = s.hash_password("correct-horse-42").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let s = service();
        assert!(s.check_password_hash("correct-horse-42", "not-a-phc-string").is_err());
    }
}
