use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    EditableEmployeeWithPassword, Employee, EmployeeFilter, EmployeePatch, EmployeeRole, EmployeeSort, Order, Page,
    Password,
};
use crate::error::ApiError;
use crate::handlers::{page, AppState};
use crate::middleware::{Principal, ADMIN_ROLE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<Order>,
    pub sort: Option<EmployeeSort>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<EmployeeRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordBody {
    pub old_password: Option<Password>,
    pub password: Password,
}

/// POST /employees - register a new employee account
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableEmployeeWithPassword>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let employee = state.service.create_employee(body).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /employees - paginated employee listing
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Employee>>, ApiError> {
    let filter = EmployeeFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        username: params.username,
        first_name: params.first_name,
        last_name: params.last_name,
        role: params.role,
    };
    Ok(Json(state.service.list_employees(filter).await?))
}

/// GET /employees/:employeeId
pub async fn get(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.service.get_employee(employee_id).await?))
}

/// PATCH /employees/:employeeId
pub async fn patch(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<EmployeePatch>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.service.patch_employee(employee_id, body).await?))
}

/// PUT /employees/:employeeId/password - the current password must be
/// supplied unless a manager performs an administrative reset
pub async fn update_password(
    State(state): State<AppState>,
    principal: Principal,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<PasswordBody>,
) -> Result<StatusCode, ApiError> {
    let employee = state.service.get_employee(employee_id).await?;
    match body.old_password {
        Some(old_password) => {
            state
                .service
                .update_employee_password(employee.username, old_password, body.password)
                .await?
        }
        None if principal.has_role(ADMIN_ROLE) => {
            state
                .service
                .reset_employee_password(employee.username, body.password)
                .await?
        }
        None => return Err(ApiError::bad_request("oldPassword is required")),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /employees/:employeeId - returns the deleted record
pub async fn delete(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.service.delete_employee(employee_id).await?))
}
