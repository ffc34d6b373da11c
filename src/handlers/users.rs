use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    EditableUserWithPassword, Order, Page, Password, User, UserFilter, UserPatch, UserSort,
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
    pub sort: Option<UserSort>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordBody {
    pub old_password: Option<Password>,
    pub password: Password,
}

/// POST /users - register a new user account
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EditableUserWithPassword>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.service.create_user(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users - paginated user listing
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<User>>, ApiError> {
    let filter = UserFilter {
        page: page(params.limit, params.offset, params.order, params.sort),
        username: params.username,
        first_name: params.first_name,
        last_name: params.last_name,
    };
    Ok(Json(state.service.list_users(filter).await?))
}

/// GET /users/:userId
pub async fn get(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.get_user(user_id).await?))
}

/// PATCH /users/:userId
pub async fn patch(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.patch_user(user_id, body).await?))
}

/// PUT /users/:userId/password - the current password must be supplied
/// unless a manager performs an administrative reset
pub async fn update_password(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
    Json(body): Json<PasswordBody>,
) -> Result<StatusCode, ApiError> {
    let user = state.service.get_user(user_id).await?;
    match body.old_password {
        Some(old_password) => {
            state
                .service
                .update_user_password(user.username, old_password, body.password)
                .await?
        }
        None if principal.has_role(ADMIN_ROLE) => {
            state.service.reset_user_password(user.username, body.password).await?
        }
        None => return Err(ApiError::bad_request("oldPassword is required")),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/:userId - returns the deleted record
pub async fn delete(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.delete_user(user_id).await?))
}
