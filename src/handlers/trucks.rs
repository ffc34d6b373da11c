use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{EditableTruck, Order, Page, Truck, TruckFilter, TruckPatch, TruckSort};
use crate::error::ApiError;
use crate::handlers::{page, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<TruckSort>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub location_name: Option<String>,
}

/// POST /trucks
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableTruck>,
) -> Result<(StatusCode, Json<Truck>), ApiError> {
    let truck = state.service.create_truck(body).await?;
    Ok((StatusCode::CREATED, Json(truck)))
}

/// GET /trucks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Truck>>, ApiError> {
    let filter = TruckFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        make: params.make,
        model: params.model,
        license_plate: params.license_plate,
        location_name: params.location_name,
    };
    Ok(Json(state.service.list_trucks(filter).await?))
}

/// GET /trucks/:truckId
pub async fn get(State(state): State<AppState>, Path(truck_id): Path<Uuid>) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.service.get_truck(truck_id).await?))
}

/// PATCH /trucks/:truckId - shrinking person capacity below the largest
/// crew already assigned to one of the truck's routes is rejected
pub async fn patch(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Json(body): Json<TruckPatch>,
) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.service.patch_truck(truck_id, body).await?))
}

/// DELETE /trucks/:truckId - returns the deleted record
pub async fn delete(State(state): State<AppState>, Path(truck_id): Path<Uuid>) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.service.delete_truck(truck_id).await?))
}
