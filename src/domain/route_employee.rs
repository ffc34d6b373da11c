use serde::{Deserialize, Serialize};

use super::employee::Employee;
use super::pagination::{PageRequest, SortField};

/// Function an employee performs on a specific route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "route_role", rename_all = "snake_case")]
pub enum RouteRole {
    Driver,
    Collector,
}

/// Employee assigned to a route, tagged with their route role.
#[derive(Debug, Clone, Serialize)]
pub struct RouteEmployee {
    #[serde(flatten)]
    pub employee: Employee,
    pub route_role: RouteRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableRouteEmployee {
    pub route_role: RouteRole,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteEmployeeSort {
    RouteRole,
    CreatedAt,
}

impl SortField for RouteEmployeeSort {
    fn column(&self) -> &'static str {
        match self {
            RouteEmployeeSort::RouteRole => "re.route_role",
            RouteEmployeeSort::CreatedAt => "re.created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteEmployeeFilter {
    pub page: PageRequest<RouteEmployeeSort>,
    pub route_role: Option<RouteRole>,
}
