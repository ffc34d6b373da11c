pub mod auth;
pub mod containers;
pub mod employees;
pub mod landfills;
pub mod routes;
pub mod trucks;
pub mod users;
pub mod warehouses;

use std::sync::Arc;

use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthnService, SubjectRole};
use crate::domain::{Order, PageRequest};
use crate::middleware::{authorize_middleware, AuthzConfig, AuthzLayer, RejectionHandlers};
use crate::service::Service;

/// Roles shorthand for the role map below.
const ALL: &[SubjectRole] = &[SubjectRole::User, SubjectRole::WasteOperator, SubjectRole::Manager];
const STAFF: &[SubjectRole] = &[SubjectRole::WasteOperator, SubjectRole::Manager];
const USER_OR_MANAGER: &[SubjectRole] = &[SubjectRole::User, SubjectRole::Manager];
const MANAGER: &[SubjectRole] = &[SubjectRole::Manager];

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

/// Builds the common pagination parameters from flat query values.
fn page<S>(limit: Option<i64>, offset: Option<i64>, order: Option<Order>, sort: Option<S>) -> PageRequest<S> {
    let mut page = PageRequest::default();
    if let Some(limit) = limit {
        page.limit = limit;
    }
    if let Some(offset) = offset {
        page.offset = offset;
    }
    if let Some(order) = order {
        page.order = order;
    }
    page.sort = sort;
    page
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// One entry per routed verb. The authorization middleware rejects anything
/// missing from this map, so adding a route here is part of adding it to the
/// router.
fn role_map() -> AuthzConfig {
    AuthzConfig::new()
        // Public surface.
        .public(Method::GET, "/health")
        .public(Method::POST, "/users")
        .public(Method::POST, "/users/signin")
        .public(Method::POST, "/employees/signin")
        // Users. `:userId` must match the token subject below manager.
        .require(Method::GET, "/users", MANAGER)
        .require(Method::GET, "/users/:userId", USER_OR_MANAGER)
        .require(Method::PATCH, "/users/:userId", USER_OR_MANAGER)
        .require(Method::PUT, "/users/:userId/password", USER_OR_MANAGER)
        .require(Method::DELETE, "/users/:userId", USER_OR_MANAGER)
        // Employees. `:employeeId` must match the token subject below manager.
        .require(Method::POST, "/employees", MANAGER)
        .require(Method::GET, "/employees", MANAGER)
        .require(Method::GET, "/employees/:employeeId", STAFF)
        .require(Method::PATCH, "/employees/:employeeId", STAFF)
        .require(Method::PUT, "/employees/:employeeId/password", STAFF)
        .require(Method::DELETE, "/employees/:employeeId", MANAGER)
        // Containers.
        .require(Method::POST, "/containers", MANAGER)
        .require(Method::GET, "/containers", ALL)
        .require(Method::GET, "/containers/:containerId", ALL)
        .require(Method::PATCH, "/containers/:containerId", MANAGER)
        .require(Method::DELETE, "/containers/:containerId", MANAGER)
        // Trucks.
        .require(Method::POST, "/trucks", MANAGER)
        .require(Method::GET, "/trucks", STAFF)
        .require(Method::GET, "/trucks/:truckId", STAFF)
        .require(Method::PATCH, "/trucks/:truckId", MANAGER)
        .require(Method::DELETE, "/trucks/:truckId", MANAGER)
        // Warehouses and parked trucks.
        .require(Method::POST, "/warehouses", MANAGER)
        .require(Method::GET, "/warehouses", STAFF)
        .require(Method::GET, "/warehouses/:warehouseId", STAFF)
        .require(Method::PATCH, "/warehouses/:warehouseId", MANAGER)
        .require(Method::DELETE, "/warehouses/:warehouseId", MANAGER)
        .require(Method::POST, "/warehouses/:warehouseId/trucks/:truckId", MANAGER)
        .require(Method::GET, "/warehouses/:warehouseId/trucks", STAFF)
        .require(Method::DELETE, "/warehouses/:warehouseId/trucks/:truckId", MANAGER)
        // Landfills.
        .require(Method::POST, "/landfills", MANAGER)
        .require(Method::GET, "/landfills", STAFF)
        .require(Method::GET, "/landfills/:landfillId", STAFF)
        .require(Method::PATCH, "/landfills/:landfillId", MANAGER)
        .require(Method::DELETE, "/landfills/:landfillId", MANAGER)
        // Routes and their associations.
        .require(Method::POST, "/routes", MANAGER)
        .require(Method::GET, "/routes", STAFF)
        .require(Method::GET, "/routes/:routeId", STAFF)
        .require(Method::PATCH, "/routes/:routeId", MANAGER)
        .require(Method::DELETE, "/routes/:routeId", MANAGER)
        .require(Method::POST, "/routes/:routeId/employees/:employeeId", MANAGER)
        .require(Method::GET, "/routes/:routeId/employees", STAFF)
        .require(Method::DELETE, "/routes/:routeId/employees/:employeeId", MANAGER)
        .require(Method::POST, "/routes/:routeId/containers/:containerId", MANAGER)
        .require(Method::GET, "/routes/:routeId/containers", STAFF)
        .require(Method::DELETE, "/routes/:routeId/containers/:containerId", MANAGER)
}

pub fn router(service: Arc<Service>, authn: Arc<AuthnService>) -> Router {
    let authz = Arc::new(AuthzLayer {
        authn,
        config: role_map(),
        handlers: RejectionHandlers::default(),
    });

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::create).get(users::list))
        .route("/users/signin", post(auth::sign_in_user))
        .route(
            "/users/:userId",
            get(users::get).patch(users::patch).delete(users::delete),
        )
        .route("/users/:userId/password", put(users::update_password))
        .route("/employees", post(employees::create).get(employees::list))
        .route("/employees/signin", post(auth::sign_in_employee))
        .route(
            "/employees/:employeeId",
            get(employees::get).patch(employees::patch).delete(employees::delete),
        )
        .route("/employees/:employeeId/password", put(employees::update_password))
        .route("/containers", post(containers::create).get(containers::list))
        .route(
            "/containers/:containerId",
            get(containers::get).patch(containers::patch).delete(containers::delete),
        )
        .route("/trucks", post(trucks::create).get(trucks::list))
        .route(
            "/trucks/:truckId",
            get(trucks::get).patch(trucks::patch).delete(trucks::delete),
        )
        .route("/warehouses", post(warehouses::create).get(warehouses::list))
        .route(
            "/warehouses/:warehouseId",
            get(warehouses::get).patch(warehouses::patch).delete(warehouses::delete),
        )
        .route("/warehouses/:warehouseId/trucks", get(warehouses::list_trucks))
        .route(
            "/warehouses/:warehouseId/trucks/:truckId",
            post(warehouses::park_truck).delete(warehouses::unpark_truck),
        )
        .route("/landfills", post(landfills::create).get(landfills::list))
        .route(
            "/landfills/:landfillId",
            get(landfills::get).patch(landfills::patch).delete(landfills::delete),
        )
        .route("/routes", post(routes::create).get(routes::list))
        .route(
            "/routes/:routeId",
            get(routes::get).patch(routes::patch).delete(routes::delete),
        )
        .route("/routes/:routeId/employees", get(routes::list_employees))
        .route(
            "/routes/:routeId/employees/:employeeId",
            post(routes::assign_employee).delete(routes::unassign_employee),
        )
        .route("/routes/:routeId/containers", get(routes::list_containers))
        .route(
            "/routes/:routeId/containers/:containerId",
            post(routes::add_container).delete(routes::remove_container),
        )
        .route_layer(from_fn_with_state(authz, authorize_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::testing::MockStore;

    const KEY: &[u8] = b"router-test-signing-key";

    fn app(store: MockStore) -> Router {
        let service = Arc::new(Service::new(AuthnService::with_fast_params(KEY), Arc::new(store)));
        router(service, Arc::new(AuthnService::with_fast_params(KEY)))
    }

    fn token(subject: Uuid, roles: &[SubjectRole]) -> String {
        AuthnService::with_fast_params(KEY).new_token(subject, roles).unwrap()
    }

    async fn send(app: Router, method: &str, uri: &str, bearer: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn public_routes_forward_without_credentials() {
        let status = send(app(MockStore::new()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_and_malformed_tokens() {
        let app = app(MockStore::new());
        assert_eq!(send(app.clone(), "GET", "/trucks", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            send(app, "GET", "/trucks", Some("not.a.token")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn tokens_signed_with_another_key_are_rejected() {
        let forged = AuthnService::with_fast_params(b"some-other-key")
            .new_token(Uuid::new_v4(), &[SubjectRole::Manager])
            .unwrap();
        let status = send(app(MockStore::new()), "GET", "/trucks", Some(&forged)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn callers_without_a_permitted_role_are_forbidden() {
        let token = token(Uuid::new_v4(), &[SubjectRole::User]);
        let status = send(app(MockStore::new()), "GET", "/users", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn ownership_parameters_must_name_the_token_subject() {
        let store = MockStore::new();
        let employee_id = store.add_employee();
        let app = app(store);
        let uri = format!("/employees/{employee_id}");

        let own = token(employee_id, &[SubjectRole::WasteOperator]);
        assert_eq!(send(app.clone(), "GET", &uri, Some(&own)).await, StatusCode::OK);

        let other = token(Uuid::new_v4(), &[SubjectRole::WasteOperator]);
        assert_eq!(send(app.clone(), "GET", &uri, Some(&other)).await, StatusCode::FORBIDDEN);

        // Managers act on any subject's resources.
        let manager = token(Uuid::new_v4(), &[SubjectRole::Manager]);
        assert_eq!(send(app, "GET", &uri, Some(&manager)).await, StatusCode::OK);
    }
}
