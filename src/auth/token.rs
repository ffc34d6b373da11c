use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthnError, AuthnService, SubjectRole};

const TOKEN_ISSUER: &str = "ecofleet";
const TOKEN_VALIDITY_HOURS: i64 = 24;

/// Claims carried by an issued token. The principal is reconstructed from
/// these on every request; nothing is persisted server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: Uuid,
    pub roles: Vec<SubjectRole>,
    pub iat: i64,
    pub exp: i64,
}

impl AuthnService {
    /// Issues a signed token for the subject with a fixed 24 hour validity
    /// window. Fails only on signing or encoding failure.
    pub fn new_token(&self, subject: Uuid, roles: &[SubjectRole]) -> Result<String, AuthnError> {
        let now = Utc::now();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: subject,
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
        };

        let key = EncodingKey::from_secret(self.signing_key());
        encode(&Header::default(), &claims, &key).map_err(|e| AuthnError::TokenSigning(e.to_string()))
    }

    /// Verifies signature, structure, issuer and expiry. Every failure mode
    /// collapses into `TokenInvalid`.
    pub fn parse_token(&self, token: &str) -> Result<Claims, AuthnError> {
        let key = DecodingKey::from_secret(self.signing_key());
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthnError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthnService {
        AuthnService::new(b"unit-test-signing-key")
    }

    #[test]
    fn token_round_trip_preserves_subject_and_roles() {
        let s = service();
        let subject = Uuid::new_v4();
        let roles = [SubjectRole::User, SubjectRole::Manager];

        let token = s.new_token(subject, &roles).unwrap();
        let claims = s.parse_token(&token).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.iss, "ecofleet");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_invalid() {
        let s = service();
        let now = Utc::now();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Uuid::new_v4(),
            roles: vec![SubjectRole::User],
            iat: (now - Duration::hours(48)).timestamp(),
            exp: (now - Duration::hours(24)).timestamp(),
        };
        let key = EncodingKey::from_secret(s.signing_key());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(matches!(s.parse_token(&token), Err(AuthnError::TokenInvalid)));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let s = service();
        let token = s.new_token(Uuid::new_v4(), &[SubjectRole::User]).unwrap();

        let other = AuthnService::new(b"a-different-signing-key");
        assert!(matches!(other.parse_token(&token), Err(AuthnError::TokenInvalid)));

        assert!(matches!(s.parse_token("not.a.jwt"), Err(AuthnError::TokenInvalid)));
    }
}
