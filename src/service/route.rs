use uuid::Uuid;

use crate::domain::{EditableRoute, Error, Page, Route, RouteFilter, RoutePatch};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create route";
const DESC_LIST: &str = "service: failed to list routes";
const DESC_GET: &str = "service: failed to get route";
const DESC_PATCH: &str = "service: failed to patch route";
const DESC_DELETE: &str = "service: failed to delete route";

impl Service {
    pub async fn create_route(&self, route: EditableRoute) -> Result<Route, Error> {
        if !route.name.valid() {
            return Err(self.fail(Error::FieldInvalid("name"), DESC_CREATE));
        }

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_route_in(&mut tx, &route).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_route_in(&self, tx: &mut Tx, route: &EditableRoute) -> Result<Route, Error> {
        let id = self.store().create_route(tx, route).await?;
        self.store().get_route(tx, id).await
    }

    pub async fn list_routes(&self, filter: RouteFilter) -> Result<Page<Route>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_routes(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_route(&self, id: Uuid) -> Result<Route, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_route(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    /// Moving the route onto a different truck requires the new truck to
    /// accommodate the employees already assigned. The check and the update
    /// run in one serializable transaction, retried on serialization failure.
    pub async fn patch_route(&self, id: Uuid, patch: RoutePatch) -> Result<Route, Error> {
        if patch.name.as_ref().is_some_and(|n| !n.valid()) {
            return Err(self.fail(Error::FieldInvalid("name"), DESC_PATCH));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
            let result = self.patch_route_in(&mut tx, id, &patch).await;
            match self.finish(tx, result, DESC_PATCH).await {
                Err(err) if Self::should_retry(&err, attempt) => continue,
                outcome => return outcome,
            }
        }
    }

    async fn patch_route_in(&self, tx: &mut Tx, id: Uuid, patch: &RoutePatch) -> Result<Route, Error> {
        if let Some(truck_id) = patch.truck_id {
            let truck = self.store().get_truck(tx, truck_id).await?;
            let assigned = self.store().count_route_employees(tx, id).await?;
            if i64::from(truck.person_capacity) < assigned {
                return Err(Error::RouteTruckPersonCapacityMinLimit);
            }
        }

        self.store().patch_route(tx, id, patch).await?;
        self.store().get_route(tx, id).await
    }

    pub async fn delete_route(&self, id: Uuid) -> Result<Route, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_route_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_route_in(&self, tx: &mut Tx, id: Uuid) -> Result<Route, Error> {
        let route = self.store().get_route(tx, id).await?;
        self.store().delete_route(tx, id).await?;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::{Error, RoutePatch};
    use crate::testing::MockStore;

    use super::super::Service;

    #[tokio::test]
    async fn moving_route_to_smaller_truck_is_rejected() {
        let store = Arc::new(MockStore::new());
        let big_truck = store.add_truck(5);
        let small_truck = store.add_truck(2);
        let route_id = store.add_route(big_truck);
        for _ in 0..4 {
            store.assign_employee(route_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = RoutePatch {
            truck_id: Some(small_truck),
            ..RoutePatch::default()
        };
        let err = service.patch_route(route_id, patch).await.unwrap_err();
        assert!(matches!(err, Error::RouteTruckPersonCapacityMinLimit));
        assert_eq!(store.route_patches(), 0);
    }

    #[tokio::test]
    async fn moving_route_to_sufficient_truck_is_allowed() {
        let store = Arc::new(MockStore::new());
        let first = store.add_truck(5);
        let second = store.add_truck(4);
        let route_id = store.add_route(first);
        for _ in 0..4 {
            store.assign_employee(route_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = RoutePatch {
            truck_id: Some(second),
            ..RoutePatch::default()
        };
        service.patch_route(route_id, patch).await.unwrap();
        assert_eq!(store.route_patches(), 1);
    }
}
