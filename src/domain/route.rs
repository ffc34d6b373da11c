use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pagination::{PageRequest, SortField};

const ROUTE_NAME_MAX_LENGTH: usize = 50;

/// Route name. May be empty; bounded in length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteName(pub String);

impl RouteName {
    pub fn valid(&self) -> bool {
        self.0.len() <= ROUTE_NAME_MAX_LENGTH
    }
}

/// Collection route: one truck, one departure warehouse, one arrival
/// warehouse, plus role-tagged employee associations.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub id: Uuid,
    pub name: RouteName,
    pub truck_id: Uuid,
    pub departure_warehouse_id: Uuid,
    pub arrival_warehouse_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableRoute {
    pub name: RouteName,
    pub truck_id: Uuid,
    pub departure_warehouse_id: Uuid,
    pub arrival_warehouse_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePatch {
    pub name: Option<RouteName>,
    pub truck_id: Option<Uuid>,
    pub departure_warehouse_id: Option<Uuid>,
    pub arrival_warehouse_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteSort {
    Name,
    CreatedAt,
    ModifiedAt,
}

impl SortField for RouteSort {
    fn column(&self) -> &'static str {
        match self {
            RouteSort::Name => "r.name",
            RouteSort::CreatedAt => "r.created_at",
            RouteSort::ModifiedAt => "r.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub page: PageRequest<RouteSort>,
    pub name: Option<String>,
    pub truck_id: Option<Uuid>,
    pub departure_warehouse_id: Option<Uuid>,
    pub arrival_warehouse_id: Option<Uuid>,
}
