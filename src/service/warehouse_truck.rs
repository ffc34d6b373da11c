use uuid::Uuid;

use crate::domain::{Error, Page, RouteFilter, Truck, WarehouseTruckFilter};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create warehouse truck";
const DESC_LIST: &str = "service: failed to list warehouse trucks";
const DESC_DELETE: &str = "service: failed to delete warehouse truck";

impl Service {
    /// Parks a truck at the warehouse. The association counts against the
    /// warehouse truck capacity; the count and the insert run in one
    /// serializable transaction, retried on serialization failure.
    pub async fn create_warehouse_truck(&self, warehouse_id: Uuid, truck_id: Uuid) -> Result<Truck, Error> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
            let result = self.create_warehouse_truck_in(&mut tx, warehouse_id, truck_id).await;
            match self.finish(tx, result, DESC_CREATE).await {
                Err(err) if Self::should_retry(&err, attempt) => continue,
                outcome => return outcome,
            }
        }
    }

    async fn create_warehouse_truck_in(
        &self,
        tx: &mut Tx,
        warehouse_id: Uuid,
        truck_id: Uuid,
    ) -> Result<Truck, Error> {
        let warehouse = self.store().get_warehouse(tx, warehouse_id).await?;

        let parked = self.store().count_warehouse_trucks(tx, warehouse_id).await?;
        if parked + 1 > i64::from(warehouse.truck_capacity) {
            return Err(Error::WarehouseTruckCapacityMaxLimit);
        }

        self.store().create_warehouse_truck(tx, warehouse_id, truck_id).await?;
        self.store().get_truck(tx, truck_id).await
    }

    pub async fn list_warehouse_trucks(
        &self,
        warehouse_id: Uuid,
        filter: WarehouseTruckFilter,
    ) -> Result<Page<Truck>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.list_warehouse_trucks_in(&mut tx, warehouse_id, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    async fn list_warehouse_trucks_in(
        &self,
        tx: &mut Tx,
        warehouse_id: Uuid,
        filter: &WarehouseTruckFilter,
    ) -> Result<Page<Truck>, Error> {
        self.store().get_warehouse(tx, warehouse_id).await?;
        self.store().list_warehouse_trucks(tx, warehouse_id, filter).await
    }

    /// Unparking is rejected while a route departs from or arrives at this
    /// warehouse with this truck.
    pub async fn delete_warehouse_truck(&self, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_warehouse_truck_in(&mut tx, warehouse_id, truck_id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_warehouse_truck_in(&self, tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
        let departures = RouteFilter {
            truck_id: Some(truck_id),
            departure_warehouse_id: Some(warehouse_id),
            ..RouteFilter::default()
        };
        if self.store().list_routes(tx, &departures).await?.total > 0 {
            return Err(Error::WarehouseTruckAssociatedWithRouteDeparture);
        }

        let arrivals = RouteFilter {
            truck_id: Some(truck_id),
            arrival_warehouse_id: Some(warehouse_id),
            ..RouteFilter::default()
        };
        if self.store().list_routes(tx, &arrivals).await?.total > 0 {
            return Err(Error::WarehouseTruckAssociatedWithRouteArrival);
        }

        self.store().delete_warehouse_truck(tx, warehouse_id, truck_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::Error;
    use crate::testing::MockStore;

    use super::super::Service;

    #[tokio::test]
    async fn parking_beyond_warehouse_capacity_is_rejected() {
        let store = Arc::new(MockStore::new());
        let warehouse_id = store.add_warehouse(2);
        for _ in 0..2 {
            let truck_id = store.add_truck(2);
            store.park_truck(warehouse_id, truck_id);
        }
        let extra_truck = store.add_truck(2);

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let err = service.create_warehouse_truck(warehouse_id, extra_truck).await.unwrap_err();
        assert!(matches!(err, Error::WarehouseTruckCapacityMaxLimit));
        assert_eq!(store.warehouse_truck_count(warehouse_id), 2);
    }

    #[tokio::test]
    async fn parking_within_warehouse_capacity_succeeds() {
        let store = Arc::new(MockStore::new());
        let warehouse_id = store.add_warehouse(3);
        for _ in 0..2 {
            let truck_id = store.add_truck(2);
            store.park_truck(warehouse_id, truck_id);
        }
        let extra_truck = store.add_truck(2);

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let parked = service.create_warehouse_truck(warehouse_id, extra_truck).await.unwrap();
        assert_eq!(parked.id, extra_truck);
        assert_eq!(store.warehouse_truck_count(warehouse_id), 3);
    }

    #[tokio::test]
    async fn unparking_a_truck_used_by_a_departing_route_is_rejected() {
        let store = Arc::new(MockStore::new());
        let warehouse_id = store.add_warehouse(3);
        let truck_id = store.add_truck(2);
        store.park_truck(warehouse_id, truck_id);
        store.add_route_between(truck_id, warehouse_id, warehouse_id);

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let err = service.delete_warehouse_truck(warehouse_id, truck_id).await.unwrap_err();
        assert!(matches!(err, Error::WarehouseTruckAssociatedWithRouteDeparture));
        assert_eq!(store.warehouse_truck_count(warehouse_id), 1);
    }
}
