use serde::{Deserialize, Serialize};

const USERNAME_MIN_LENGTH: usize = 1;
const USERNAME_MAX_LENGTH: usize = 50;

const NAME_MIN_LENGTH: usize = 1;
const NAME_MAX_LENGTH: usize = 50;

/// Username of a user or employee account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn valid(&self) -> bool {
        (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&self.0.len())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Person name (first or last).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(pub String);

impl Name {
    pub fn valid(&self) -> bool {
        (NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&self.0.len())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password as received from the caller. Never stored or logged.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Password(pub String);

impl Password {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Stored credential record used by the sign-in operations.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: Username,
    pub password_hash: String,
}

/// Collapses consecutive whitespace and joins the words with a hyphen.
pub fn hyphenate_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Collapses consecutive whitespace into single spaces.
pub fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_bounds() {
        assert!(!Username(String::new()).valid());
        assert!(Username("driver-01".into()).valid());
        assert!(!Username("x".repeat(51)).valid());
    }

    #[test]
    fn password_debug_never_prints_value() {
        let rendered = format!("{:?}", Password("hunter2hunter2!".into()));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn space_normalization() {
        assert_eq!(hyphenate_spaces("  maria  joao "), "maria-joao");
        assert_eq!(collapse_spaces("rua  do   ouro"), "rua do ouro");
    }
}
