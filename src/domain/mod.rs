pub mod common;
pub mod container;
pub mod employee;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod landfill;
pub mod pagination;
pub mod route;
pub mod route_container;
pub mod route_employee;
pub mod truck;
pub mod user;
pub mod warehouse;
pub mod warehouse_truck;

pub use common::{collapse_spaces, hyphenate_spaces, Credentials, Name, Password, Username};
pub use container::{Container, ContainerCategory, ContainerFilter, ContainerPatch, ContainerSort, EditableContainer};
pub use employee::{
    EditableEmployee, EditableEmployeeWithPassword, Employee, EmployeeFilter, EmployeePatch, EmployeeRole, EmployeeSort,
};
pub use error::Error;
pub use geo::{Municipality, Road};
pub use geojson::{Geometry, Location, LocationProperties};
pub use landfill::{EditableLandfill, Landfill, LandfillFilter, LandfillPatch, LandfillSort};
pub use pagination::{Order, Page, PageRequest, SortField};
pub use route::{EditableRoute, Route, RouteFilter, RouteName, RoutePatch, RouteSort};
pub use route_container::{RouteContainerFilter, RouteContainerSort};
pub use route_employee::{
    EditableRouteEmployee, RouteEmployee, RouteEmployeeFilter, RouteEmployeeSort, RouteRole,
};
pub use truck::{EditableTruck, Truck, TruckFilter, TruckPatch, TruckSort};
pub use user::{EditableUser, EditableUserWithPassword, User, UserFilter, UserPatch, UserSort};
pub use warehouse::{EditableWarehouse, Warehouse, WarehouseFilter, WarehousePatch, WarehouseSort};
pub use warehouse_truck::{WarehouseTruckFilter, WarehouseTruckSort};
