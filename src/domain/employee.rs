use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Name, Password, Username};
use super::geojson::{Geometry, Location};
use super::pagination::{PageRequest, SortField};

/// Fleet role of an employee account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "employee_role", rename_all = "snake_case")]
pub enum EmployeeRole {
    WasteOperator,
    Manager,
}

/// Employee of the waste-collection fleet, geolocated at their home base.
#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: Uuid,
    pub username: Username,
    pub first_name: Name,
    pub last_name: Name,
    pub role: EmployeeRole,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableEmployee {
    pub username: Username,
    pub first_name: Name,
    pub last_name: Name,
    pub role: EmployeeRole,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableEmployeeWithPassword {
    #[serde(flatten)]
    pub employee: EditableEmployee,
    pub password: Password,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePatch {
    pub username: Option<Username>,
    pub first_name: Option<Name>,
    pub last_name: Option<Name>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeSort {
    Username,
    FirstName,
    LastName,
    Role,
    CreatedAt,
    ModifiedAt,
}

impl SortField for EmployeeSort {
    fn column(&self) -> &'static str {
        match self {
            EmployeeSort::Username => "e.username",
            EmployeeSort::FirstName => "e.first_name",
            EmployeeSort::LastName => "e.last_name",
            EmployeeSort::Role => "e.role",
            EmployeeSort::CreatedAt => "e.created_at",
            EmployeeSort::ModifiedAt => "e.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub page: PageRequest<EmployeeSort>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<EmployeeRole>,
}
