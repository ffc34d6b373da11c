use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    Container, ContainerCategory, ContainerFilter, ContainerPatch, ContainerSort, EditableContainer, Order, Page,
};
use crate::error::ApiError;
use crate::handlers::{page, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<ContainerSort>,
    pub category: Option<ContainerCategory>,
    pub location_name: Option<String>,
}

/// POST /containers
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableContainer>,
) -> Result<(StatusCode, Json<Container>), ApiError> {
    let container = state.service.create_container(body).await?;
    Ok((StatusCode::CREATED, Json(container)))
}

/// GET /containers - paginated, filterable by category and location name
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Container>>, ApiError> {
    let filter = ContainerFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        category: params.category,
        location_name: params.location_name,
    };
    Ok(Json(state.service.list_containers(filter).await?))
}

/// GET /containers/:containerId
pub async fn get(
    State(state): State<AppState>,
    Path(container_id): Path<Uuid>,
) -> Result<Json<Container>, ApiError> {
    Ok(Json(state.service.get_container(container_id).await?))
}

/// PATCH /containers/:containerId
pub async fn patch(
    State(state): State<AppState>,
    Path(container_id): Path<Uuid>,
    Json(body): Json<ContainerPatch>,
) -> Result<Json<Container>, ApiError> {
    Ok(Json(state.service.patch_container(container_id, body).await?))
}

/// DELETE /containers/:containerId - returns the deleted record
pub async fn delete(
    State(state): State<AppState>,
    Path(container_id): Path<Uuid>,
) -> Result<Json<Container>, ApiError> {
    Ok(Json(state.service.delete_container(container_id).await?))
}
