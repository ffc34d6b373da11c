use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geojson::{Geometry, Location};
use super::pagination::{PageRequest, SortField};

const MAKE_MAX_LENGTH: usize = 50;
const MODEL_MAX_LENGTH: usize = 50;
const LICENSE_PLATE_MAX_LENGTH: usize = 16;

/// Collection truck. `person_capacity` bounds the number of employees that
/// can be assigned to any route using this truck.
#[derive(Debug, Clone, Serialize)]
pub struct Truck {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub person_capacity: i32,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableTruck {
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub person_capacity: i32,
    pub geometry: Geometry,
}

impl EditableTruck {
    pub fn make_valid(&self) -> bool {
        !self.make.is_empty() && self.make.len() <= MAKE_MAX_LENGTH
    }

    pub fn model_valid(&self) -> bool {
        !self.model.is_empty() && self.model.len() <= MODEL_MAX_LENGTH
    }

    pub fn license_plate_valid(&self) -> bool {
        !self.license_plate.is_empty() && self.license_plate.len() <= LICENSE_PLATE_MAX_LENGTH
    }

    pub fn person_capacity_valid(&self) -> bool {
        self.person_capacity > 0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TruckPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub person_capacity: Option<i32>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TruckSort {
    Make,
    Model,
    LicensePlate,
    PersonCapacity,
    WayName,
    MunicipalityName,
    CreatedAt,
    ModifiedAt,
}

impl SortField for TruckSort {
    fn column(&self) -> &'static str {
        match self {
            TruckSort::Make => "t.make",
            TruckSort::Model => "t.model",
            TruckSort::LicensePlate => "t.license_plate",
            TruckSort::PersonCapacity => "t.person_capacity",
            TruckSort::WayName => "rn.way_name",
            TruckSort::MunicipalityName => "m.name",
            TruckSort::CreatedAt => "t.created_at",
            TruckSort::ModifiedAt => "t.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TruckFilter {
    pub page: PageRequest<TruckSort>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub location_name: Option<String>,
}
