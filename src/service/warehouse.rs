use uuid::Uuid;

use crate::domain::{EditableWarehouse, Error, Page, Warehouse, WarehouseFilter, WarehousePatch};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create warehouse";
const DESC_LIST: &str = "service: failed to list warehouses";
const DESC_GET: &str = "service: failed to get warehouse";
const DESC_PATCH: &str = "service: failed to patch warehouse";
const DESC_DELETE: &str = "service: failed to delete warehouse";

impl Service {
    pub async fn create_warehouse(&self, warehouse: EditableWarehouse) -> Result<Warehouse, Error> {
        if !warehouse.truck_capacity_valid() {
            return Err(self.fail(Error::FieldInvalid("truckCapacity"), DESC_CREATE));
        }
        let point = match warehouse.geometry.as_point() {
            Some(point) => point,
            None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_CREATE)),
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_warehouse_in(&mut tx, &warehouse, point).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_warehouse_in(
        &self,
        tx: &mut Tx,
        warehouse: &EditableWarehouse,
        point: [f64; 2],
    ) -> Result<Warehouse, Error> {
        let (road_id, municipality_id) = self.locate(tx, point).await?;
        let id = self.store().create_warehouse(tx, warehouse, road_id, municipality_id).await?;
        self.store().get_warehouse(tx, id).await
    }

    pub async fn list_warehouses(&self, filter: WarehouseFilter) -> Result<Page<Warehouse>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_warehouses(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_warehouse(&self, id: Uuid) -> Result<Warehouse, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_warehouse(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    /// Reducing `truck_capacity` below the number of trucks currently parked
    /// at the warehouse is rejected. The check and the update run in one
    /// serializable transaction, retried on serialization failure.
    pub async fn patch_warehouse(&self, id: Uuid, patch: WarehousePatch) -> Result<Warehouse, Error> {
        if patch.truck_capacity.is_some_and(|c| c <= 0) {
            return Err(self.fail(Error::FieldInvalid("truckCapacity"), DESC_PATCH));
        }
        let point = match &patch.geometry {
            Some(geometry) => match geometry.as_point() {
                Some(point) => Some(point),
                None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_PATCH)),
            },
            None => None,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
            let result = self.patch_warehouse_in(&mut tx, id, &patch, point).await;
            match self.finish(tx, result, DESC_PATCH).await {
                Err(err) if Self::should_retry(&err, attempt) => continue,
                outcome => return outcome,
            }
        }
    }

    async fn patch_warehouse_in(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &WarehousePatch,
        point: Option<[f64; 2]>,
    ) -> Result<Warehouse, Error> {
        if let Some(truck_capacity) = patch.truck_capacity {
            let parked = self.store().count_warehouse_trucks(tx, id).await?;
            if i64::from(truck_capacity) < parked {
                return Err(Error::WarehouseTruckCapacityMinLimit);
            }
        }

        let (road_id, municipality_id) = match point {
            Some(point) => self.locate(tx, point).await?,
            None => (None, None),
        };
        self.store().patch_warehouse(tx, id, patch, road_id, municipality_id).await?;
        self.store().get_warehouse(tx, id).await
    }

    /// Fails while the warehouse still has trucks or serves as a route
    /// departure or arrival.
    pub async fn delete_warehouse(&self, id: Uuid) -> Result<Warehouse, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_warehouse_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_warehouse_in(&self, tx: &mut Tx, id: Uuid) -> Result<Warehouse, Error> {
        let warehouse = self.store().get_warehouse(tx, id).await?;
        self.store().delete_warehouse(tx, id).await?;
        Ok(warehouse)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::{Error, WarehousePatch};
    use crate::testing::MockStore;

    use super::super::Service;

    #[tokio::test]
    async fn shrinking_truck_capacity_below_parked_trucks_is_rejected() {
        let store = Arc::new(MockStore::new());
        let warehouse_id = store.add_warehouse(5);
        for _ in 0..4 {
            let truck_id = store.add_truck(2);
            store.park_truck(warehouse_id, truck_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = WarehousePatch {
            truck_capacity: Some(3),
            ..WarehousePatch::default()
        };
        let err = service.patch_warehouse(warehouse_id, patch).await.unwrap_err();
        assert!(matches!(err, Error::WarehouseTruckCapacityMinLimit));
        assert_eq!(store.warehouse_patches(), 0);
    }

    #[tokio::test]
    async fn shrinking_truck_capacity_to_parked_count_is_allowed() {
        let store = Arc::new(MockStore::new());
        let warehouse_id = store.add_warehouse(5);
        for _ in 0..4 {
            let truck_id = store.add_truck(2);
            store.park_truck(warehouse_id, truck_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = WarehousePatch {
            truck_capacity: Some(4),
            ..WarehousePatch::default()
        };
        service.patch_warehouse(warehouse_id, patch).await.unwrap();
        assert_eq!(store.warehouse_patches(), 1);
    }
}
