use serde::Deserialize;

use super::pagination::{PageRequest, SortField};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteContainerSort {
    CreatedAt,
}

impl SortField for RouteContainerSort {
    fn column(&self) -> &'static str {
        match self {
            RouteContainerSort::CreatedAt => "rc.created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteContainerFilter {
    pub page: PageRequest<RouteContainerSort>,
}
