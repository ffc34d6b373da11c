use uuid::Uuid;

use crate::domain::{Error, Page, RouteEmployee, RouteEmployeeFilter, RouteRole};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create route employee";
const DESC_LIST: &str = "service: failed to list route employees";
const DESC_DELETE: &str = "service: failed to delete route employee";

impl Service {
    /// Assigns an employee to the route. The assignment counts against the
    /// person capacity of the route's truck; the count and the insert run in
    /// one serializable transaction, retried on serialization failure.
    pub async fn create_route_employee(
        &self,
        route_id: Uuid,
        employee_id: Uuid,
        role: RouteRole,
    ) -> Result<RouteEmployee, Error> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
            let result = self.create_route_employee_in(&mut tx, route_id, employee_id, role).await;
            match self.finish(tx, result, DESC_CREATE).await {
                Err(err) if Self::should_retry(&err, attempt) => continue,
                outcome => return outcome,
            }
        }
    }

    async fn create_route_employee_in(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        employee_id: Uuid,
        role: RouteRole,
    ) -> Result<RouteEmployee, Error> {
        let route = self.store().get_route(tx, route_id).await?;
        let truck = self.store().get_truck(tx, route.truck_id).await?;

        let assigned = self.store().count_route_employees(tx, route_id).await?;
        if assigned + 1 > i64::from(truck.person_capacity) {
            return Err(Error::RouteTruckPersonCapacityMaxLimit);
        }

        self.store().create_route_employee(tx, route_id, employee_id, role).await?;
        let employee = self.store().get_employee(tx, employee_id).await?;

        Ok(RouteEmployee {
            employee,
            route_role: role,
        })
    }

    pub async fn list_route_employees(
        &self,
        route_id: Uuid,
        filter: RouteEmployeeFilter,
    ) -> Result<Page<RouteEmployee>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.list_route_employees_in(&mut tx, route_id, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    async fn list_route_employees_in(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteEmployeeFilter,
    ) -> Result<Page<RouteEmployee>, Error> {
        self.store().get_route(tx, route_id).await?;
        self.store().list_route_employees(tx, route_id, filter).await
    }

    pub async fn delete_route_employee(&self, route_id: Uuid, employee_id: Uuid) -> Result<(), Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.store().delete_route_employee(&mut tx, route_id, employee_id).await;
        self.finish(tx, result, DESC_DELETE).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::{Error, RouteRole};
    use crate::testing::MockStore;

    use super::super::Service;

    #[tokio::test]
    async fn assignment_beyond_truck_capacity_is_rejected() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(2);
        let route_id = store.add_route(truck_id);
        for _ in 0..2 {
            store.assign_employee(route_id);
        }
        let employee_id = store.add_employee();

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let err = service
            .create_route_employee(route_id, employee_id, RouteRole::Collector)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RouteTruckPersonCapacityMaxLimit));
        // The association row was never written.
        assert_eq!(store.route_employee_count(route_id), 2);
    }

    #[tokio::test]
    async fn assignment_within_truck_capacity_succeeds() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(3);
        let route_id = store.add_route(truck_id);
        for _ in 0..2 {
            store.assign_employee(route_id);
        }
        let employee_id = store.add_employee();

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let assigned = service
            .create_route_employee(route_id, employee_id, RouteRole::Driver)
            .await
            .unwrap();
        assert_eq!(assigned.employee.id, employee_id);
        assert_eq!(assigned.route_role, RouteRole::Driver);
        assert_eq!(store.route_employee_count(route_id), 3);
    }

    #[tokio::test]
    async fn assignment_to_unknown_route_is_rejected() {
        let store = Arc::new(MockStore::new());
        let employee_id = store.add_employee();

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let err = service
            .create_route_employee(uuid::Uuid::new_v4(), employee_id, RouteRole::Driver)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RouteNotFound));
    }
}
