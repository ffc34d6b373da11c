use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{Password, Username};
use crate::error::ApiError;
use crate::handlers::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: Username,
    pub password: Password,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /users/signin - exchange user credentials for a bearer token
pub async fn sign_in_user(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.service.sign_in_user(body.username, body.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /employees/signin - exchange employee credentials for a bearer token
pub async fn sign_in_employee(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.service.sign_in_employee(body.username, body.password).await?;
    Ok(Json(TokenResponse { token }))
}
