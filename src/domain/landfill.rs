use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geojson::{Geometry, Location};
use super::pagination::{PageRequest, SortField};

/// Landfill where collected waste is discharged.
#[derive(Debug, Clone, Serialize)]
pub struct Landfill {
    pub id: Uuid,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableLandfill {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandfillPatch {
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LandfillSort {
    WayName,
    MunicipalityName,
    CreatedAt,
    ModifiedAt,
}

impl SortField for LandfillSort {
    fn column(&self) -> &'static str {
        match self {
            LandfillSort::WayName => "rn.way_name",
            LandfillSort::MunicipalityName => "m.name",
            LandfillSort::CreatedAt => "l.created_at",
            LandfillSort::ModifiedAt => "l.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LandfillFilter {
    pub page: PageRequest<LandfillSort>,
    pub location_name: Option<String>,
}
