//! In-memory store double for service tests. Only the methods the invariant
//! tests exercise are implemented; the rest panic on use.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Container, ContainerFilter, ContainerPatch, Credentials, EditableContainer, EditableEmployee, EditableLandfill,
    EditableRoute, EditableTruck, EditableUser, EditableWarehouse, Employee, EmployeeFilter, EmployeePatch,
    EmployeeRole, Error, Geometry, Landfill, LandfillFilter, LandfillPatch, Location, Municipality, Name, Page, Road,
    Route, RouteContainerFilter, RouteEmployee, RouteEmployeeFilter, RouteFilter, RouteName, RoutePatch, RouteRole,
    Truck, TruckFilter, TruckPatch, User, UserFilter, UserPatch, Username, Warehouse, WarehouseFilter, WarehousePatch,
    WarehouseTruckFilter,
};
use crate::service::Store;
use crate::store::tx::{AccessMode, IsolationLevel, Tx};

fn somewhere() -> Location {
    Location {
        geometry: Geometry::point(-8.6291, 41.1579),
        properties: Default::default(),
    }
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, (User, String)>,
    trucks: HashMap<Uuid, Truck>,
    warehouses: HashMap<Uuid, Warehouse>,
    employees: HashMap<Uuid, Employee>,
    routes: HashMap<Uuid, Route>,
    route_employees: HashMap<Uuid, Vec<(Uuid, RouteRole)>>,
    warehouse_trucks: HashMap<Uuid, Vec<Uuid>>,
    truck_patches: usize,
    warehouse_patches: usize,
    route_patches: usize,
}

#[derive(Default)]
pub struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str, password_hash: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let user = User {
            id,
            username: Username(username.to_string()),
            first_name: Name("Ana".into()),
            last_name: Name("Silva".into()),
            created_at: now,
            modified_at: now,
        };
        self.state.lock().unwrap().users.insert(id, (user, password_hash.to_string()));
        id
    }

    pub fn add_truck(&self, person_capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().unwrap().trucks.insert(
            id,
            Truck {
                id,
                make: "Volvo".into(),
                model: "FE".into(),
                license_plate: format!("AA-{:02}-AA", person_capacity),
                person_capacity,
                location: somewhere(),
                created_at: now,
                modified_at: now,
            },
        );
        id
    }

    pub fn add_warehouse(&self, truck_capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().unwrap().warehouses.insert(
            id,
            Warehouse {
                id,
                truck_capacity,
                location: somewhere(),
                created_at: now,
                modified_at: now,
            },
        );
        id
    }

    pub fn add_employee(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().unwrap().employees.insert(
            id,
            Employee {
                id,
                username: Username(format!("employee-{id}")),
                first_name: Name("Ana".into()),
                last_name: Name("Silva".into()),
                role: EmployeeRole::WasteOperator,
                location: somewhere(),
                created_at: now,
                modified_at: now,
            },
        );
        id
    }

    pub fn add_route(&self, truck_id: Uuid) -> Uuid {
        let warehouse_id = self.add_warehouse(10);
        self.add_route_between(truck_id, warehouse_id, warehouse_id)
    }

    pub fn add_route_between(&self, truck_id: Uuid, departure: Uuid, arrival: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().unwrap().routes.insert(
            id,
            Route {
                id,
                name: RouteName("morning run".into()),
                truck_id,
                departure_warehouse_id: departure,
                arrival_warehouse_id: arrival,
                created_at: now,
                modified_at: now,
            },
        );
        id
    }

    pub fn assign_employee(&self, route_id: Uuid) -> Uuid {
        let employee_id = self.add_employee();
        self.state
            .lock()
            .unwrap()
            .route_employees
            .entry(route_id)
            .or_default()
            .push((employee_id, RouteRole::Collector));
        employee_id
    }

    pub fn park_truck(&self, warehouse_id: Uuid, truck_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .warehouse_trucks
            .entry(warehouse_id)
            .or_default()
            .push(truck_id);
    }

    pub fn truck_patches(&self) -> usize {
        self.state.lock().unwrap().truck_patches
    }

    pub fn warehouse_patches(&self) -> usize {
        self.state.lock().unwrap().warehouse_patches
    }

    pub fn route_patches(&self) -> usize {
        self.state.lock().unwrap().route_patches
    }

    pub fn route_employee_count(&self, route_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .route_employees
            .get(&route_id)
            .map_or(0, Vec::len)
    }

    pub fn warehouse_truck_count(&self, warehouse_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .warehouse_trucks
            .get(&warehouse_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl Store for MockStore {
    async fn begin(&self, _isolation: IsolationLevel, _access: AccessMode) -> Result<Tx, Error> {
        Ok(Tx::detached())
    }

    async fn create_user(&self, _tx: &mut Tx, _user: &EditableUser, _password_hash: &str) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_users(&self, _tx: &mut Tx, _filter: &UserFilter) -> Result<Page<User>, Error> {
        unimplemented!()
    }

    async fn get_user(&self, _tx: &mut Tx, _id: Uuid) -> Result<User, Error> {
        unimplemented!()
    }

    async fn get_user_by_username(&self, _tx: &mut Tx, username: &Username) -> Result<User, Error> {
        self.state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|(user, _)| user.username == *username)
            .map(|(user, _)| user.clone())
            .ok_or(Error::UserNotFound)
    }

    async fn get_user_sign_in(&self, _tx: &mut Tx, username: &Username) -> Result<Credentials, Error> {
        self.state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|(user, _)| user.username == *username)
            .map(|(user, hash)| Credentials {
                username: user.username.clone(),
                password_hash: hash.clone(),
            })
            .ok_or(Error::UserNotFound)
    }

    async fn patch_user(&self, _tx: &mut Tx, _id: Uuid, _patch: &UserPatch) -> Result<(), Error> {
        unimplemented!()
    }

    async fn update_user_password(&self, _tx: &mut Tx, _username: &Username, _hash: &str) -> Result<(), Error> {
        unimplemented!()
    }

    async fn delete_user(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_employee(
        &self,
        _tx: &mut Tx,
        _employee: &EditableEmployee,
        _password_hash: &str,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_employees(&self, _tx: &mut Tx, _filter: &EmployeeFilter) -> Result<Page<Employee>, Error> {
        unimplemented!()
    }

    async fn get_employee(&self, _tx: &mut Tx, id: Uuid) -> Result<Employee, Error> {
        self.state
            .lock()
            .unwrap()
            .employees
            .get(&id)
            .cloned()
            .ok_or(Error::EmployeeNotFound)
    }

    async fn get_employee_by_username(&self, _tx: &mut Tx, _username: &Username) -> Result<Employee, Error> {
        unimplemented!()
    }

    async fn get_employee_sign_in(&self, _tx: &mut Tx, _username: &Username) -> Result<Credentials, Error> {
        unimplemented!()
    }

    async fn patch_employee(
        &self,
        _tx: &mut Tx,
        _id: Uuid,
        _patch: &EmployeePatch,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        unimplemented!()
    }

    async fn update_employee_password(&self, _tx: &mut Tx, _username: &Username, _hash: &str) -> Result<(), Error> {
        unimplemented!()
    }

    async fn delete_employee(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_container(
        &self,
        _tx: &mut Tx,
        _container: &EditableContainer,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_containers(&self, _tx: &mut Tx, _filter: &ContainerFilter) -> Result<Page<Container>, Error> {
        unimplemented!()
    }

    async fn get_container(&self, _tx: &mut Tx, _id: Uuid) -> Result<Container, Error> {
        unimplemented!()
    }

    async fn patch_container(
        &self,
        _tx: &mut Tx,
        _id: Uuid,
        _patch: &ContainerPatch,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        unimplemented!()
    }

    async fn delete_container(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_truck(
        &self,
        _tx: &mut Tx,
        _truck: &EditableTruck,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_trucks(&self, _tx: &mut Tx, _filter: &TruckFilter) -> Result<Page<Truck>, Error> {
        unimplemented!()
    }

    async fn get_truck(&self, _tx: &mut Tx, id: Uuid) -> Result<Truck, Error> {
        self.state.lock().unwrap().trucks.get(&id).cloned().ok_or(Error::TruckNotFound)
    }

    async fn patch_truck(
        &self,
        _tx: &mut Tx,
        id: Uuid,
        patch: &TruckPatch,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let truck = state.trucks.get_mut(&id).ok_or(Error::TruckNotFound)?;
        if let Some(person_capacity) = patch.person_capacity {
            truck.person_capacity = person_capacity;
        }
        state.truck_patches += 1;
        Ok(())
    }

    async fn delete_truck(&self, _tx: &mut Tx, id: Uuid) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state.routes.values().any(|route| route.truck_id == id) {
            return Err(Error::TruckAssociatedWithRoute);
        }
        state.trucks.remove(&id).map(|_| ()).ok_or(Error::TruckNotFound)
    }

    async fn create_warehouse(
        &self,
        _tx: &mut Tx,
        _warehouse: &EditableWarehouse,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_warehouses(&self, _tx: &mut Tx, _filter: &WarehouseFilter) -> Result<Page<Warehouse>, Error> {
        unimplemented!()
    }

    async fn get_warehouse(&self, _tx: &mut Tx, id: Uuid) -> Result<Warehouse, Error> {
        self.state
            .lock()
            .unwrap()
            .warehouses
            .get(&id)
            .cloned()
            .ok_or(Error::WarehouseNotFound)
    }

    async fn patch_warehouse(
        &self,
        _tx: &mut Tx,
        id: Uuid,
        patch: &WarehousePatch,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let warehouse = state.warehouses.get_mut(&id).ok_or(Error::WarehouseNotFound)?;
        if let Some(truck_capacity) = patch.truck_capacity {
            warehouse.truck_capacity = truck_capacity;
        }
        state.warehouse_patches += 1;
        Ok(())
    }

    async fn delete_warehouse(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_landfill(
        &self,
        _tx: &mut Tx,
        _landfill: &EditableLandfill,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_landfills(&self, _tx: &mut Tx, _filter: &LandfillFilter) -> Result<Page<Landfill>, Error> {
        unimplemented!()
    }

    async fn get_landfill(&self, _tx: &mut Tx, _id: Uuid) -> Result<Landfill, Error> {
        unimplemented!()
    }

    async fn patch_landfill(
        &self,
        _tx: &mut Tx,
        _id: Uuid,
        _patch: &LandfillPatch,
        _road_id: Option<i64>,
        _municipality_id: Option<i64>,
    ) -> Result<(), Error> {
        unimplemented!()
    }

    async fn delete_landfill(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_route(&self, _tx: &mut Tx, _route: &EditableRoute) -> Result<Uuid, Error> {
        unimplemented!()
    }

    async fn list_routes(&self, _tx: &mut Tx, filter: &RouteFilter) -> Result<Page<Route>, Error> {
        let state = self.state.lock().unwrap();
        let results: Vec<Route> = state
            .routes
            .values()
            .filter(|r| filter.truck_id.map_or(true, |id| r.truck_id == id))
            .filter(|r| {
                filter
                    .departure_warehouse_id
                    .map_or(true, |id| r.departure_warehouse_id == id)
            })
            .filter(|r| filter.arrival_warehouse_id.map_or(true, |id| r.arrival_warehouse_id == id))
            .cloned()
            .collect();

        Ok(Page {
            total: results.len() as i64,
            results,
        })
    }

    async fn get_route(&self, _tx: &mut Tx, id: Uuid) -> Result<Route, Error> {
        self.state.lock().unwrap().routes.get(&id).cloned().ok_or(Error::RouteNotFound)
    }

    async fn patch_route(&self, _tx: &mut Tx, id: Uuid, patch: &RoutePatch) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let route = state.routes.get_mut(&id).ok_or(Error::RouteNotFound)?;
        if let Some(truck_id) = patch.truck_id {
            route.truck_id = truck_id;
        }
        state.route_patches += 1;
        Ok(())
    }

    async fn delete_route(&self, _tx: &mut Tx, _id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn count_route_employees(&self, _tx: &mut Tx, route_id: Uuid) -> Result<i64, Error> {
        Ok(self.route_employee_count(route_id) as i64)
    }

    async fn count_warehouse_trucks(&self, _tx: &mut Tx, warehouse_id: Uuid) -> Result<i64, Error> {
        Ok(self.warehouse_truck_count(warehouse_id) as i64)
    }

    async fn max_route_employee_count_for_truck(&self, _tx: &mut Tx, truck_id: Uuid) -> Result<i64, Error> {
        let state = self.state.lock().unwrap();
        let max = state
            .routes
            .values()
            .filter(|r| r.truck_id == truck_id)
            .map(|r| state.route_employees.get(&r.id).map_or(0, Vec::len))
            .max()
            .unwrap_or(0);
        Ok(max as i64)
    }

    async fn create_route_employee(
        &self,
        _tx: &mut Tx,
        route_id: Uuid,
        employee_id: Uuid,
        role: RouteRole,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let assignments = state.route_employees.entry(route_id).or_default();
        if assignments.iter().any(|(id, _)| *id == employee_id) {
            return Err(Error::RouteEmployeeAlreadyExists);
        }
        assignments.push((employee_id, role));
        Ok(())
    }

    async fn list_route_employees(
        &self,
        _tx: &mut Tx,
        _route_id: Uuid,
        _filter: &RouteEmployeeFilter,
    ) -> Result<Page<RouteEmployee>, Error> {
        unimplemented!()
    }

    async fn delete_route_employee(&self, _tx: &mut Tx, route_id: Uuid, employee_id: Uuid) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let assignments = state.route_employees.entry(route_id).or_default();
        let before = assignments.len();
        assignments.retain(|(id, _)| *id != employee_id);
        if assignments.len() == before {
            return Err(Error::RouteEmployeeNotFound);
        }
        Ok(())
    }

    async fn create_route_container(&self, _tx: &mut Tx, _route_id: Uuid, _container_id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn list_route_containers(
        &self,
        _tx: &mut Tx,
        _route_id: Uuid,
        _filter: &RouteContainerFilter,
    ) -> Result<Page<Container>, Error> {
        unimplemented!()
    }

    async fn delete_route_container(&self, _tx: &mut Tx, _route_id: Uuid, _container_id: Uuid) -> Result<(), Error> {
        unimplemented!()
    }

    async fn create_warehouse_truck(&self, _tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let parked = state.warehouse_trucks.entry(warehouse_id).or_default();
        if parked.contains(&truck_id) {
            return Err(Error::WarehouseTruckAlreadyExists);
        }
        parked.push(truck_id);
        Ok(())
    }

    async fn list_warehouse_trucks(
        &self,
        _tx: &mut Tx,
        _warehouse_id: Uuid,
        _filter: &WarehouseTruckFilter,
    ) -> Result<Page<Truck>, Error> {
        unimplemented!()
    }

    async fn delete_warehouse_truck(&self, _tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let parked = state.warehouse_trucks.entry(warehouse_id).or_default();
        let before = parked.len();
        parked.retain(|id| *id != truck_id);
        if parked.len() == before {
            return Err(Error::WarehouseTruckNotFound);
        }
        Ok(())
    }

    async fn get_road_by_geometry(&self, _tx: &mut Tx, _point: [f64; 2]) -> Result<Road, Error> {
        Err(Error::RoadNotFound)
    }

    async fn get_municipality_by_geometry(&self, _tx: &mut Tx, _point: [f64; 2]) -> Result<Municipality, Error> {
        Err(Error::MunicipalityNotFound)
    }
}
