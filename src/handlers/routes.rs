use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    Container, EditableRoute, EditableRouteEmployee, Order, Page, Route, RouteContainerFilter, RouteContainerSort,
    RouteEmployee, RouteEmployeeFilter, RouteEmployeeSort, RouteFilter, RoutePatch, RouteRole, RouteSort,
};
use crate::error::ApiError;
use crate::handlers::{page, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<RouteSort>,
    pub name: Option<String>,
    pub truck_id: Option<Uuid>,
    pub departure_warehouse_id: Option<Uuid>,
    pub arrival_warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmployeesParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<RouteEmployeeSort>,
    pub route_role: Option<RouteRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainersParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<RouteContainerSort>,
}

/// POST /routes
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableRoute>,
) -> Result<(StatusCode, Json<Route>), ApiError> {
    let route = state.service.create_route(body).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

/// GET /routes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Route>>, ApiError> {
    let filter = RouteFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        name: params.name,
        truck_id: params.truck_id,
        departure_warehouse_id: params.departure_warehouse_id,
        arrival_warehouse_id: params.arrival_warehouse_id,
    };
    Ok(Json(state.service.list_routes(filter).await?))
}

/// GET /routes/:routeId
pub async fn get(State(state): State<AppState>, Path(route_id): Path<Uuid>) -> Result<Json<Route>, ApiError> {
    Ok(Json(state.service.get_route(route_id).await?))
}

/// PATCH /routes/:routeId - moving the route to a truck with fewer seats
/// than the crew already assigned is rejected
pub async fn patch(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Json(body): Json<RoutePatch>,
) -> Result<Json<Route>, ApiError> {
    Ok(Json(state.service.patch_route(route_id, body).await?))
}

/// DELETE /routes/:routeId - returns the deleted record
pub async fn delete(State(state): State<AppState>, Path(route_id): Path<Uuid>) -> Result<Json<Route>, ApiError> {
    Ok(Json(state.service.delete_route(route_id).await?))
}

/// POST /routes/:routeId/employees/:employeeId - assign an employee, capped
/// by the person capacity of the route's truck
pub async fn assign_employee(
    State(state): State<AppState>,
    Path((route_id, employee_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<EditableRouteEmployee>,
) -> Result<(StatusCode, Json<RouteEmployee>), ApiError> {
    let assigned = state.service.create_route_employee(route_id, employee_id, body.route_role).await?;
    Ok((StatusCode::CREATED, Json(assigned)))
}

/// GET /routes/:routeId/employees
pub async fn list_employees(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Query(params): Query<ListEmployeesParams>,
) -> Result<Json<Page<RouteEmployee>>, ApiError> {
    let filter = RouteEmployeeFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        route_role: params.route_role,
    };
    Ok(Json(state.service.list_route_employees(route_id, filter).await?))
}

/// DELETE /routes/:routeId/employees/:employeeId
pub async fn unassign_employee(
    State(state): State<AppState>,
    Path((route_id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_route_employee(route_id, employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /routes/:routeId/containers/:containerId - schedule a container for
/// collection on this route
pub async fn add_container(
    State(state): State<AppState>,
    Path((route_id, container_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<Container>), ApiError> {
    let container = state.service.create_route_container(route_id, container_id).await?;
    Ok((StatusCode::CREATED, Json(container)))
}

/// GET /routes/:routeId/containers
pub async fn list_containers(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Query(params): Query<ListContainersParams>,
) -> Result<Json<Page<Container>>, ApiError> {
    let filter = RouteContainerFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
    };
    Ok(Json(state.service.list_route_containers(route_id, filter).await?))
}

/// DELETE /routes/:routeId/containers/:containerId
pub async fn remove_container(
    State(state): State<AppState>,
    Path((route_id, container_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_route_container(route_id, container_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
