use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    EditableWarehouse, Order, Page, Truck, Warehouse, WarehouseFilter, WarehousePatch, WarehouseSort,
    WarehouseTruckFilter, WarehouseTruckSort,
};
use crate::error::ApiError;
use crate::handlers::{page, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<WarehouseSort>,
    pub location_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTrucksParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<WarehouseTruckSort>,
}

/// POST /warehouses
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableWarehouse>,
) -> Result<(StatusCode, Json<Warehouse>), ApiError> {
    let warehouse = state.service.create_warehouse(body).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// GET /warehouses
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Warehouse>>, ApiError> {
    let filter = WarehouseFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        location_name: params.location_name,
    };
    Ok(Json(state.service.list_warehouses(filter).await?))
}

/// GET /warehouses/:warehouseId
pub async fn get(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<Warehouse>, ApiError> {
    Ok(Json(state.service.get_warehouse(warehouse_id).await?))
}

/// PATCH /warehouses/:warehouseId - shrinking truck capacity below the
/// number of trucks already parked there is rejected
pub async fn patch(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(body): Json<WarehousePatch>,
) -> Result<Json<Warehouse>, ApiError> {
    Ok(Json(state.service.patch_warehouse(warehouse_id, body).await?))
}

/// DELETE /warehouses/:warehouseId - returns the deleted record
pub async fn delete(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<Warehouse>, ApiError> {
    Ok(Json(state.service.delete_warehouse(warehouse_id).await?))
}

/// POST /warehouses/:warehouseId/trucks/:truckId - park a truck, capped by
/// the warehouse truck capacity
pub async fn park_truck(
    State(state): State<AppState>,
    Path((warehouse_id, truck_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<Truck>), ApiError> {
    let truck = state.service.create_warehouse_truck(warehouse_id, truck_id).await?;
    Ok((StatusCode::CREATED, Json(truck)))
}

/// GET /warehouses/:warehouseId/trucks
pub async fn list_trucks(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Query(params): Query<ListTrucksParams>,
) -> Result<Json<Page<Truck>>, ApiError> {
    let filter = WarehouseTruckFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
    };
    Ok(Json(state.service.list_warehouse_trucks(warehouse_id, filter).await?))
}

/// DELETE /warehouses/:warehouseId/trucks/:truckId - rejected while a route
/// still departs from or arrives at this warehouse with this truck
pub async fn unpark_truck(
    State(state): State<AppState>,
    Path((warehouse_id, truck_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_warehouse_truck(warehouse_id, truck_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
