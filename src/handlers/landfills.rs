use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{EditableLandfill, Landfill, LandfillFilter, LandfillPatch, LandfillSort, Order, Page};
use crate::error::ApiError;
use crate::handlers::{page, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<LandfillSort>,
    pub location_name: Option<String>,
}

/// POST /landfills
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableLandfill>,
) -> Result<(StatusCode, Json<Landfill>), ApiError> {
    let landfill = state.service.create_landfill(body).await?;
    Ok((StatusCode::CREATED, Json(landfill)))
}

/// GET /landfills
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Landfill>>, ApiError> {
    let filter = LandfillFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        location_name: params.location_name,
    };
    Ok(Json(state.service.list_landfills(filter).await?))
}

/// GET /landfills/:landfillId
pub async fn get(
    State(state): State<AppState>,
    Path(landfill_id): Path<Uuid>,
) -> Result<Json<Landfill>, ApiError> {
    Ok(Json(state.service.get_landfill(landfill_id).await?))
}

/// PATCH /landfills/:landfillId
pub async fn patch(
    State(state): State<AppState>,
    Path(landfill_id): Path<Uuid>,
    Json(body): Json<LandfillPatch>,
) -> Result<Json<Landfill>, ApiError> {
    Ok(Json(state.service.patch_landfill(landfill_id, body).await?))
}

/// DELETE /landfills/:landfillId - returns the deleted record
pub async fn delete(
    State(state): State<AppState>,
    Path(landfill_id): Path<Uuid>,
) -> Result<Json<Landfill>, ApiError> {
    Ok(Json(state.service.delete_landfill(landfill_id).await?))
}
