use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geojson::{Geometry, Location};
use super::pagination::{PageRequest, SortField};

/// Truck depot. `truck_capacity` bounds the number of trucks that can be
/// associated with this warehouse.
#[derive(Debug, Clone, Serialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub truck_capacity: i32,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableWarehouse {
    pub truck_capacity: i32,
    pub geometry: Geometry,
}

impl EditableWarehouse {
    pub fn truck_capacity_valid(&self) -> bool {
        self.truck_capacity > 0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehousePatch {
    pub truck_capacity: Option<i32>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarehouseSort {
    TruckCapacity,
    WayName,
    MunicipalityName,
    CreatedAt,
    ModifiedAt,
}

impl SortField for WarehouseSort {
    fn column(&self) -> &'static str {
        match self {
            WarehouseSort::TruckCapacity => "w.truck_capacity",
            WarehouseSort::WayName => "rn.way_name",
            WarehouseSort::MunicipalityName => "m.name",
            WarehouseSort::CreatedAt => "w.created_at",
            WarehouseSort::ModifiedAt => "w.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WarehouseFilter {
    pub page: PageRequest<WarehouseSort>,
    pub location_name: Option<String>,
}
