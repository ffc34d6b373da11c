pub mod container;
pub mod employee;
pub mod landfill;
pub mod route;
pub mod route_container;
pub mod route_employee;
pub mod truck;
pub mod user;
pub mod warehouse;
pub mod warehouse_truck;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthnService;
use crate::domain::{
    Container, ContainerFilter, ContainerPatch, Credentials, EditableContainer, EditableEmployee, EditableLandfill,
    EditableRoute, EditableTruck, EditableUser, EditableWarehouse, Employee, EmployeeFilter, EmployeePatch, Error,
    Landfill, LandfillFilter, LandfillPatch, Municipality, Page, Road, Route, RouteContainerFilter, RouteEmployee,
    RouteEmployeeFilter, RouteFilter, RoutePatch, RouteRole, Truck, TruckFilter, TruckPatch, User, UserFilter,
    UserPatch, Username, Warehouse, WarehouseFilter, WarehousePatch, WarehouseTruckFilter,
};
use crate::store::tx::{AccessMode, IsolationLevel, Tx};

/// Bounded retry for read-modify-write transactions that hit a serialization
/// failure under Serializable isolation.
const SERIALIZATION_RETRY_ATTEMPTS: u32 = 3;

/// Narrow interface of the persistence collaborator. Implemented by
/// `store::PgStore`; service tests substitute an in-memory mock.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self, isolation: IsolationLevel, access: AccessMode) -> Result<Tx, Error>;

    // Users.
    async fn create_user(&self, tx: &mut Tx, user: &EditableUser, password_hash: &str) -> Result<Uuid, Error>;
    async fn list_users(&self, tx: &mut Tx, filter: &UserFilter) -> Result<Page<User>, Error>;
    async fn get_user(&self, tx: &mut Tx, id: Uuid) -> Result<User, Error>;
    async fn get_user_by_username(&self, tx: &mut Tx, username: &Username) -> Result<User, Error>;
    async fn get_user_sign_in(&self, tx: &mut Tx, username: &Username) -> Result<Credentials, Error>;
    async fn patch_user(&self, tx: &mut Tx, id: Uuid, patch: &UserPatch) -> Result<(), Error>;
    async fn update_user_password(&self, tx: &mut Tx, username: &Username, password_hash: &str) -> Result<(), Error>;
    async fn delete_user(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Employees.
    async fn create_employee(
        &self,
        tx: &mut Tx,
        employee: &EditableEmployee,
        password_hash: &str,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error>;
    async fn list_employees(&self, tx: &mut Tx, filter: &EmployeeFilter) -> Result<Page<Employee>, Error>;
    async fn get_employee(&self, tx: &mut Tx, id: Uuid) -> Result<Employee, Error>;
    async fn get_employee_by_username(&self, tx: &mut Tx, username: &Username) -> Result<Employee, Error>;
    async fn get_employee_sign_in(&self, tx: &mut Tx, username: &Username) -> Result<Credentials, Error>;
    async fn patch_employee(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &EmployeePatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error>;
    async fn update_employee_password(
        &self,
        tx: &mut Tx,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), Error>;
    async fn delete_employee(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Containers.
    async fn create_container(
        &self,
        tx: &mut Tx,
        container: &EditableContainer,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error>;
    async fn list_containers(&self, tx: &mut Tx, filter: &ContainerFilter) -> Result<Page<Container>, Error>;
    async fn get_container(&self, tx: &mut Tx, id: Uuid) -> Result<Container, Error>;
    async fn patch_container(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &ContainerPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error>;
    async fn delete_container(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Trucks.
    async fn create_truck(
        &self,
        tx: &mut Tx,
        truck: &EditableTruck,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error>;
    async fn list_trucks(&self, tx: &mut Tx, filter: &TruckFilter) -> Result<Page<Truck>, Error>;
    async fn get_truck(&self, tx: &mut Tx, id: Uuid) -> Result<Truck, Error>;
    async fn patch_truck(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &TruckPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error>;
    async fn delete_truck(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Warehouses.
    async fn create_warehouse(
        &self,
        tx: &mut Tx,
        warehouse: &EditableWarehouse,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error>;
    async fn list_warehouses(&self, tx: &mut Tx, filter: &WarehouseFilter) -> Result<Page<Warehouse>, Error>;
    async fn get_warehouse(&self, tx: &mut Tx, id: Uuid) -> Result<Warehouse, Error>;
    async fn patch_warehouse(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &WarehousePatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error>;
    async fn delete_warehouse(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Landfills.
    async fn create_landfill(
        &self,
        tx: &mut Tx,
        landfill: &EditableLandfill,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error>;
    async fn list_landfills(&self, tx: &mut Tx, filter: &LandfillFilter) -> Result<Page<Landfill>, Error>;
    async fn get_landfill(&self, tx: &mut Tx, id: Uuid) -> Result<Landfill, Error>;
    async fn patch_landfill(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &LandfillPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error>;
    async fn delete_landfill(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Routes.
    async fn create_route(&self, tx: &mut Tx, route: &EditableRoute) -> Result<Uuid, Error>;
    async fn list_routes(&self, tx: &mut Tx, filter: &RouteFilter) -> Result<Page<Route>, Error>;
    async fn get_route(&self, tx: &mut Tx, id: Uuid) -> Result<Route, Error>;
    async fn patch_route(&self, tx: &mut Tx, id: Uuid, patch: &RoutePatch) -> Result<(), Error>;
    async fn delete_route(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error>;

    // Association counts used by the capacity invariants.
    async fn count_route_employees(&self, tx: &mut Tx, route_id: Uuid) -> Result<i64, Error>;
    async fn count_warehouse_trucks(&self, tx: &mut Tx, warehouse_id: Uuid) -> Result<i64, Error>;
    async fn max_route_employee_count_for_truck(&self, tx: &mut Tx, truck_id: Uuid) -> Result<i64, Error>;

    // Route employee associations.
    async fn create_route_employee(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        employee_id: Uuid,
        role: RouteRole,
    ) -> Result<(), Error>;
    async fn list_route_employees(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteEmployeeFilter,
    ) -> Result<Page<RouteEmployee>, Error>;
    async fn delete_route_employee(&self, tx: &mut Tx, route_id: Uuid, employee_id: Uuid) -> Result<(), Error>;

    // Route container associations.
    async fn create_route_container(&self, tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error>;
    async fn list_route_containers(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteContainerFilter,
    ) -> Result<Page<Container>, Error>;
    async fn delete_route_container(&self, tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error>;

    // Warehouse truck associations.
    async fn create_warehouse_truck(&self, tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error>;
    async fn list_warehouse_trucks(
        &self,
        tx: &mut Tx,
        warehouse_id: Uuid,
        filter: &WarehouseTruckFilter,
    ) -> Result<Page<Truck>, Error>;
    async fn delete_warehouse_truck(&self, tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error>;

    // Geospatial lookups.
    async fn get_road_by_geometry(&self, tx: &mut Tx, point: [f64; 2]) -> Result<Road, Error>;
    async fn get_municipality_by_geometry(&self, tx: &mut Tx, point: [f64; 2]) -> Result<Municipality, Error>;
}

/// Application service layer: one method per business operation, each running
/// inside a single transaction with cross-entity invariants enforced before
/// commit.
pub struct Service {
    authn: AuthnService,
    store: Arc<dyn Store>,
}

impl Service {
    pub fn new(authn: AuthnService, store: Arc<dyn Store>) -> Self {
        Self { authn, store }
    }

    pub(crate) fn authn(&self) -> &AuthnService {
        &self.authn
    }

    pub(crate) fn store(&self) -> &dyn Store {
        &*self.store
    }

    pub(crate) async fn begin_read(&self) -> Result<Tx, Error> {
        self.store.begin(IsolationLevel::ReadCommitted, AccessMode::ReadOnly).await
    }

    /// Read-modify-write transactions run serializable so capacity checks and
    /// the writes they guard cannot interleave with a conflicting commit.
    pub(crate) async fn begin_write(&self) -> Result<Tx, Error> {
        self.store.begin(IsolationLevel::Serializable, AccessMode::ReadWrite).await
    }

    /// Commits on success, rolls back on failure, and logs the outcome with
    /// the operation description at the appropriate severity.
    pub(crate) async fn finish<T>(&self, mut tx: Tx, result: Result<T, Error>, desc: &'static str) -> Result<T, Error> {
        match result {
            Ok(value) => match tx.commit().await {
                Ok(()) => Ok(value),
                Err(err) => Err(self.fail(Error::from(err), desc)),
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "service: failed to rollback transaction");
                }
                Err(self.fail(err, desc))
            }
        }
    }

    /// Logs a failed operation and attaches the operation description to
    /// unexpected errors.
    pub(crate) fn fail(&self, err: Error, desc: &'static str) -> Error {
        match err {
            Error::Unexpected(inner) => {
                tracing::error!(error = %inner, "{desc}");
                Error::Unexpected(inner.context(desc))
            }
            expected => {
                tracing::info!(error = %expected, "{desc}");
                expected
            }
        }
    }

    /// Runs a serializable operation, retrying a bounded number of times on
    /// serialization failure before surfacing the error.
    pub(crate) fn should_retry(err: &Error, attempt: u32) -> bool {
        attempt < SERIALIZATION_RETRY_ATTEMPTS && err.is_serialization_failure()
    }

    /// Resolves the nearest road and containing municipality for a point, if
    /// any. Absence of either is not an error; the identifiers are left unset.
    pub(crate) async fn locate(
        &self,
        tx: &mut Tx,
        point: [f64; 2],
    ) -> Result<(Option<i64>, Option<i64>), Error> {
        let road_id = match self.store.get_road_by_geometry(tx, point).await {
            Ok(road) => Some(road.id),
            Err(Error::RoadNotFound) => None,
            Err(err) => return Err(err),
        };

        let municipality_id = match self.store.get_municipality_by_geometry(tx, point).await {
            Ok(municipality) => Some(municipality.id),
            Err(Error::MunicipalityNotFound) => None,
            Err(err) => return Err(err),
        };

        Ok((road_id, municipality_id))
    }
}

/// Shared pre-transaction filter validation.
pub(crate) fn validate_page<S>(page: &crate::domain::PageRequest<S>) -> Result<(), Error> {
    if !page.limit_valid() {
        return Err(Error::FilterInvalid("limit"));
    }
    if !page.offset_valid() {
        return Err(Error::FilterInvalid("offset"));
    }
    Ok(())
}
