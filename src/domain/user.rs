use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Name, Password, Username};
use super::pagination::{PageRequest, SortField};

/// Resident account of the municipal services portal.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    pub first_name: Name,
    pub last_name: Name,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableUser {
    pub username: Username,
    pub first_name: Name,
    pub last_name: Name,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableUserWithPassword {
    #[serde(flatten)]
    pub user: EditableUser,
    pub password: Password,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<Username>,
    pub first_name: Option<Name>,
    pub last_name: Option<Name>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSort {
    Username,
    FirstName,
    LastName,
    CreatedAt,
    ModifiedAt,
}

impl SortField for UserSort {
    fn column(&self) -> &'static str {
        match self {
            UserSort::Username => "u.username",
            UserSort::FirstName => "u.first_name",
            UserSort::LastName => "u.last_name",
            UserSort::CreatedAt => "u.created_at",
            UserSort::ModifiedAt => "u.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub page: PageRequest<UserSort>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
