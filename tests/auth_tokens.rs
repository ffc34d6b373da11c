use ecofleet_api::auth::{AuthnService, SubjectRole};
use uuid::Uuid;

#[test]
fn issued_tokens_parse_back_to_the_same_subject_and_roles() {
    let authn = AuthnService::new(b"integration-test-key");
    let subject = Uuid::new_v4();

    let token = authn
        .new_token(subject, &[SubjectRole::WasteOperator, SubjectRole::Manager])
        .unwrap();
    let claims = authn.parse_token(&token).unwrap();

    assert_eq!(claims.sub, subject);
    assert_eq!(claims.roles, vec![SubjectRole::WasteOperator, SubjectRole::Manager]);
}

#[test]
fn tokens_do_not_verify_under_a_different_key() {
    let token = AuthnService::new(b"key-one")
        .new_token(Uuid::new_v4(), &[SubjectRole::User])
        .unwrap();

    assert!(AuthnService::new(b"key-two").parse_token(&token).is_err());
}

#[test]
fn password_policy_requires_length_digit_and_symbol() {
    let authn = AuthnService::new(b"integration-test-key");

    assert!(authn.valid_password("correct-horse-battery-1"));

    // Too short, no digit, no symbol, respectively.
    assert!(!authn.valid_password("short-1!"));
    assert!(!authn.valid_password("correct-horse-battery"));
    assert!(!authn.valid_password("correcthorsebattery11"));
}

#[test]
fn password_hashes_verify_only_the_original_password() {
    let authn = AuthnService::new(b"integration-test-key");

    let hash = authn.hash_password("correct-horse-battery-1").unwrap();
    assert!(authn.check_password_hash("correct-horse-battery-1", &hash).unwrap());
    assert!(!authn.check_password_hash("wrong-horse-battery-1", &hash).unwrap());
}
