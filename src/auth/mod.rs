mod password;
mod token;

pub use token::Claims;

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse-grained permission tag embedded in issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectRole {
    User,
    WasteOperator,
    Manager,
}

#[derive(Debug, Error)]
pub enum AuthnError {
    /// Malformed structure, bad signature or expired token.
    #[error("invalid token")]
    TokenInvalid,
    #[error("failed to sign token: {0}")]
    TokenSigning(String),
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error("malformed password hash: {0}")]
    PasswordHashInvalid(String),
}

/// Credential service: password hashing/verification and signed-token
/// issuance/parsing. Stateless; holds only the symmetric signing key and the
/// Argon2 instance.
pub struct AuthnService {
    signing_key: Vec<u8>,
    argon2: Argon2<'static>,
}

impl AuthnService {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            signing_key: signing_key.to_vec(),
            argon2: Argon2::default(),
        }
    }

    /// Low-cost Argon2 parameters so hashing-heavy tests stay fast.
    #[cfg(test)]
    pub fn with_fast_params(signing_key: &[u8]) -> Self {
        use argon2::{Algorithm, Params, Version};

        let params = Params::new(4096, 1, 1, Some(32)).expect("valid argon2 params");
        Self {
            signing_key: signing_key.to_vec(),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub(crate) fn argon2(&self) -> &Argon2<'static> {
        &self.argon2
    }
}
