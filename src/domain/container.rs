use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geojson::{Geometry, Location};
use super::pagination::{PageRequest, SortField};

/// Waste category collected by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "container_category", rename_all = "snake_case")]
pub enum ContainerCategory {
    General,
    Paper,
    Plastic,
    Metal,
    Glass,
    Organic,
}

/// Street container collected by the fleet.
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    pub id: Uuid,
    pub category: ContainerCategory,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditableContainer {
    pub category: ContainerCategory,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerPatch {
    pub category: Option<ContainerCategory>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerSort {
    Category,
    WayName,
    MunicipalityName,
    CreatedAt,
    ModifiedAt,
}

impl SortField for ContainerSort {
    fn column(&self) -> &'static str {
        match self {
            ContainerSort::Category => "c.category",
            ContainerSort::WayName => "rn.way_name",
            ContainerSort::MunicipalityName => "m.name",
            ContainerSort::CreatedAt => "c.created_at",
            ContainerSort::ModifiedAt => "c.modified_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerFilter {
    pub page: PageRequest<ContainerSort>,
    pub category: Option<ContainerCategory>,
    pub location_name: Option<String>,
}
