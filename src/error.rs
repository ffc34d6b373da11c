// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::domain;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert domain errors to ApiError
impl From<domain::Error> for ApiError {
    fn from(err: domain::Error) -> Self {
        use domain::Error::*;

        match err {
            FieldInvalid(_) | FilterInvalid(_) => ApiError::bad_request(err.to_string()),

            CredentialsIncorrect => ApiError::unauthorized(err.to_string()),

            UserNotFound | EmployeeNotFound | ContainerNotFound | TruckNotFound | WarehouseNotFound
            | WarehouseTruckNotFound | LandfillNotFound | RouteNotFound | RouteDepartureWarehouseNotFound
            | RouteArrivalWarehouseNotFound | RouteEmployeeNotFound | RouteContainerNotFound | RoadNotFound
            | MunicipalityNotFound => ApiError::not_found(err.to_string()),

            UserAlreadyExists
            | EmployeeAlreadyExists
            | ContainerAssociatedWithRoute
            | TruckAssociatedWithWarehouse
            | TruckAssociatedWithRoute
            | WarehouseTruckCapacityMinLimit
            | WarehouseTruckCapacityMaxLimit
            | WarehouseAssociatedWithTruck
            | WarehouseAssociatedWithRouteDeparture
            | WarehouseAssociatedWithRouteArrival
            | WarehouseTruckAlreadyExists
            | WarehouseTruckAssociatedWithRouteDeparture
            | WarehouseTruckAssociatedWithRouteArrival
            | RouteTruckPersonCapacityMinLimit
            | RouteTruckPersonCapacityMaxLimit
            | RouteEmployeeAlreadyExists
            | RouteContainerAlreadyExists => ApiError::conflict(err.to_string()),

            // The cause is already logged by the service layer.
            Unexpected(_) => ApiError::internal_server_error("An error occurred while processing your request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(ApiError::from(Error::FieldInvalid("username")).status_code(), 400);
        assert_eq!(ApiError::from(Error::CredentialsIncorrect).status_code(), 401);
        assert_eq!(ApiError::from(Error::RouteNotFound).status_code(), 404);
        assert_eq!(ApiError::from(Error::RouteTruckPersonCapacityMaxLimit).status_code(), 409);
        assert_eq!(ApiError::from(Error::Unexpected(anyhow::anyhow!("boom"))).status_code(), 500);
    }

    #[test]
    fn unexpected_errors_never_leak_details() {
        let api = ApiError::from(Error::Unexpected(anyhow::anyhow!("connection refused to 10.0.0.3")));
        assert!(!api.message().contains("10.0.0.3"));
    }
}
