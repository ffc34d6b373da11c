use serde::Deserialize;

use super::pagination::{PageRequest, SortField};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarehouseTruckSort {
    LicensePlate,
    CreatedAt,
}

impl SortField for WarehouseTruckSort {
    fn column(&self) -> &'static str {
        match self {
            WarehouseTruckSort::LicensePlate => "t.license_plate",
            WarehouseTruckSort::CreatedAt => "wt.created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WarehouseTruckFilter {
    pub page: PageRequest<WarehouseTruckSort>,
}
