pub mod tx;

mod container;
mod employee;
mod geo;
mod landfill;
mod route;
mod route_container;
mod route_employee;
mod truck;
mod user;
mod warehouse;
mod warehouse_truck;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    Container, ContainerFilter, ContainerPatch, Credentials, EditableContainer, EditableEmployee, EditableLandfill,
    EditableRoute, EditableTruck, EditableUser, EditableWarehouse, Employee, EmployeeFilter, EmployeePatch, Error,
    Geometry, Landfill, LandfillFilter, LandfillPatch, Location, LocationProperties, Municipality, Page, Road, Route,
    RouteContainerFilter, RouteEmployee, RouteEmployeeFilter, RouteFilter, RoutePatch, RouteRole, Truck, TruckFilter,
    TruckPatch, User, UserFilter, UserPatch, Username, Warehouse, WarehouseFilter, WarehousePatch,
    WarehouseTruckFilter,
};
use crate::service::Store;
use tx::{AccessMode, IsolationLevel, Tx};

/// Postgres-backed store. All statements run on a transaction handed in by
/// the service layer; the pool is only used to open new transactions.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }
}

/// Wraps an infrastructure failure.
pub(crate) fn unexpected(err: sqlx::Error) -> Error {
    Error::Unexpected(err.into())
}

/// Name of the constraint a statement violated, if the error carries one.
pub(crate) fn constraint(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error().and_then(|db| db.constraint())
}

/// Serializes a geometry to the GeoJSON text `ST_GeomFromGeoJSON` consumes.
pub(crate) fn geometry_json(geometry: &Geometry) -> Result<String, Error> {
    serde_json::to_string(geometry).map_err(|e| Error::Unexpected(e.into()))
}

/// Rebuilds a `Location` from the standard projection columns: `geojson`
/// (`ST_AsGeoJSON` output), `way_name` and `municipality_name`.
pub(crate) fn location_from_row(row: &PgRow) -> Result<Location, Error> {
    let geojson: String = row.try_get("geojson").map_err(unexpected)?;
    let geometry: Geometry = serde_json::from_str(&geojson).map_err(|e| Error::Unexpected(e.into()))?;

    Ok(Location {
        geometry,
        properties: LocationProperties {
            way_name: row.try_get("way_name").map_err(unexpected)?,
            municipality_name: row.try_get("municipality_name").map_err(unexpected)?,
        },
    })
}

/// Column a list query orders by: the whitelisted sort field when one was
/// requested, otherwise the given default.
pub(crate) fn sort_column<S: crate::domain::SortField + Copy>(sort: Option<S>, default: &'static str) -> &'static str {
    sort.map_or(default, |s| s.column())
}

/// Total row count from the `count(*) OVER()` window column, zero when the
/// page is empty.
pub(crate) fn page_total(rows: &[PgRow]) -> Result<i64, Error> {
    match rows.first() {
        Some(row) => row.try_get("total").map_err(unexpected),
        None => Ok(0),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self, isolation: IsolationLevel, access: AccessMode) -> Result<Tx, Error> {
        Tx::begin(&self.pool, isolation, access).await.map_err(Error::from)
    }

    async fn create_user(&self, tx: &mut Tx, user: &EditableUser, password_hash: &str) -> Result<Uuid, Error> {
        user::create(tx, user, password_hash).await
    }

    async fn list_users(&self, tx: &mut Tx, filter: &UserFilter) -> Result<Page<User>, Error> {
        user::list(tx, filter).await
    }

    async fn get_user(&self, tx: &mut Tx, id: Uuid) -> Result<User, Error> {
        user::get(tx, id).await
    }

    async fn get_user_by_username(&self, tx: &mut Tx, username: &Username) -> Result<User, Error> {
        user::get_by_username(tx, username).await
    }

    async fn get_user_sign_in(&self, tx: &mut Tx, username: &Username) -> Result<Credentials, Error> {
        user::get_sign_in(tx, username).await
    }

    async fn patch_user(&self, tx: &mut Tx, id: Uuid, patch: &UserPatch) -> Result<(), Error> {
        user::patch(tx, id, patch).await
    }

    async fn update_user_password(&self, tx: &mut Tx, username: &Username, password_hash: &str) -> Result<(), Error> {
        user::update_password(tx, username, password_hash).await
    }

    async fn delete_user(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        user::delete(tx, id).await
    }

    async fn create_employee(
        &self,
        tx: &mut Tx,
        employee: &EditableEmployee,
        password_hash: &str,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        employee::create(tx, employee, password_hash, road_id, municipality_id).await
    }

    async fn list_employees(&self, tx: &mut Tx, filter: &EmployeeFilter) -> Result<Page<Employee>, Error> {
        employee::list(tx, filter).await
    }

    async fn get_employee(&self, tx: &mut Tx, id: Uuid) -> Result<Employee, Error> {
        employee::get(tx, id).await
    }

    async fn get_employee_by_username(&self, tx: &mut Tx, username: &Username) -> Result<Employee, Error> {
        employee::get_by_username(tx, username).await
    }

    async fn get_employee_sign_in(&self, tx: &mut Tx, username: &Username) -> Result<Credentials, Error> {
        employee::get_sign_in(tx, username).await
    }

    async fn patch_employee(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &EmployeePatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        employee::patch(tx, id, patch, road_id, municipality_id).await
    }

    async fn update_employee_password(
        &self,
        tx: &mut Tx,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), Error> {
        employee::update_password(tx, username, password_hash).await
    }

    async fn delete_employee(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        employee::delete(tx, id).await
    }

    async fn create_container(
        &self,
        tx: &mut Tx,
        container: &EditableContainer,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        container::create(tx, container, road_id, municipality_id).await
    }

    async fn list_containers(&self, tx: &mut Tx, filter: &ContainerFilter) -> Result<Page<Container>, Error> {
        container::list(tx, filter).await
    }

    async fn get_container(&self, tx: &mut Tx, id: Uuid) -> Result<Container, Error> {
        container::get(tx, id).await
    }

    async fn patch_container(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &ContainerPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        container::patch(tx, id, patch, road_id, municipality_id).await
    }

    async fn delete_container(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        container::delete(tx, id).await
    }

    async fn create_truck(
        &self,
        tx: &mut Tx,
        truck: &EditableTruck,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        truck::create(tx, truck, road_id, municipality_id).await
    }

    async fn list_trucks(&self, tx: &mut Tx, filter: &TruckFilter) -> Result<Page<Truck>, Error> {
        truck::list(tx, filter).await
    }

    async fn get_truck(&self, tx: &mut Tx, id: Uuid) -> Result<Truck, Error> {
        truck::get(tx, id).await
    }

    async fn patch_truck(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &TruckPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        truck::patch(tx, id, patch, road_id, municipality_id).await
    }

    async fn delete_truck(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        truck::delete(tx, id).await
    }

    async fn create_warehouse(
        &self,
        tx: &mut Tx,
        warehouse: &EditableWarehouse,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        warehouse::create(tx, warehouse, road_id, municipality_id).await
    }

    async fn list_warehouses(&self, tx: &mut Tx, filter: &WarehouseFilter) -> Result<Page<Warehouse>, Error> {
        warehouse::list(tx, filter).await
    }

    async fn get_warehouse(&self, tx: &mut Tx, id: Uuid) -> Result<Warehouse, Error> {
        warehouse::get(tx, id).await
    }

    async fn patch_warehouse(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &WarehousePatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        warehouse::patch(tx, id, patch, road_id, municipality_id).await
    }

    async fn delete_warehouse(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        warehouse::delete(tx, id).await
    }

    async fn create_landfill(
        &self,
        tx: &mut Tx,
        landfill: &EditableLandfill,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        landfill::create(tx, landfill, road_id, municipality_id).await
    }

    async fn list_landfills(&self, tx: &mut Tx, filter: &LandfillFilter) -> Result<Page<Landfill>, Error> {
        landfill::list(tx, filter).await
    }

    async fn get_landfill(&self, tx: &mut Tx, id: Uuid) -> Result<Landfill, Error> {
        landfill::get(tx, id).await
    }

    async fn patch_landfill(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &LandfillPatch,
        road_id: Option<i64>,
        municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        landfill::patch(tx, id, patch, road_id, municipality_id).await
    }

    async fn delete_landfill(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        landfill::delete(tx, id).await
    }

    async fn create_route(&self, tx: &mut Tx, route: &EditableRoute) -> Result<Uuid, Error> {
        route::create(tx, route).await
    }

    async fn list_routes(&self, tx: &mut Tx, filter: &RouteFilter) -> Result<Page<Route>, Error> {
        route::list(tx, filter).await
    }

    async fn get_route(&self, tx: &mut Tx, id: Uuid) -> Result<Route, Error> {
        route::get(tx, id).await
    }

    async fn patch_route(&self, tx: &mut Tx, id: Uuid, patch: &RoutePatch) -> Result<(), Error> {
        route::patch(tx, id, patch).await
    }

    async fn delete_route(&self, tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        route::delete(tx, id).await
    }

    async fn count_route_employees(&self, tx: &mut Tx, route_id: Uuid) -> Result<i64, Error> {
        route_employee::count(tx, route_id).await
    }

    async fn count_warehouse_trucks(&self, tx: &mut Tx, warehouse_id: Uuid) -> Result<i64, Error> {
        warehouse_truck::count(tx, warehouse_id).await
    }

    async fn max_route_employee_count_for_truck(&self, tx: &mut Tx, truck_id: Uuid) -> Result<i64, Error> {
        route_employee::max_count_for_truck(tx, truck_id).await
    }

    async fn create_route_employee(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        employee_id: Uuid,
        role: RouteRole,
    ) -> Result<(), Error> {
        route_employee::create(tx, route_id, employee_id, role).await
    }

    async fn list_route_employees(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteEmployeeFilter,
    ) -> Result<Page<RouteEmployee>, Error> {
        route_employee::list(tx, route_id, filter).await
    }

    async fn delete_route_employee(&self, tx: &mut Tx, route_id: Uuid, employee_id: Uuid) -> Result<(), Error> {
        route_employee::delete(tx, route_id, employee_id).await
    }

    async fn create_route_container(&self, tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error> {
        route_container::create(tx, route_id, container_id).await
    }

    async fn list_route_containers(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteContainerFilter,
    ) -> Result<Page<Container>, Error> {
        route_container::list(tx, route_id, filter).await
    }

    async fn delete_route_container(&self, tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error> {
        route_container::delete(tx, route_id, container_id).await
    }

    async fn create_warehouse_truck(&self, tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        warehouse_truck::create(tx, warehouse_id, truck_id).await
    }

    async fn list_warehouse_trucks(
        &self,
        tx: &mut Tx,
        warehouse_id: Uuid,
        filter: &WarehouseTruckFilter,
    ) -> Result<Page<Truck>, Error> {
        warehouse_truck::list(tx, warehouse_id, filter).await
    }

    async fn delete_warehouse_truck(&self, tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        warehouse_truck::delete(tx, warehouse_id, truck_id).await
    }

    async fn get_road_by_geometry(&self, tx: &mut Tx, point: [f64; 2]) -> Result<Road, Error> {
        geo::road_by_point(tx, point).await
    }

    async fn get_municipality_by_geometry(&self, tx: &mut Tx, point: [f64; 2]) -> Result<Municipality, Error> {
        geo::municipality_by_point(tx, point).await
    }
}
