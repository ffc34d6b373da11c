use uuid::Uuid;

use crate::domain::{EditableTruck, Error, Page, Truck, TruckFilter, TruckPatch};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create truck";
const DESC_LIST: &str = "service: failed to list trucks";
const DESC_GET: &str = "service: failed to get truck";
const DESC_PATCH: &str = "service: failed to patch truck";
const DESC_DELETE: &str = "service: failed to delete truck";

fn validate(truck: &EditableTruck) -> Result<[f64; 2], Error> {
    if !truck.make_valid() {
        return Err(Error::FieldInvalid("make"));
    }
    if !truck.model_valid() {
        return Err(Error::FieldInvalid("model"));
    }
    if !truck.license_plate_valid() {
        return Err(Error::FieldInvalid("licensePlate"));
    }
    if !truck.person_capacity_valid() {
        return Err(Error::FieldInvalid("personCapacity"));
    }
    truck.geometry.as_point().ok_or(Error::FieldInvalid("geometry"))
}

impl Service {
    pub async fn create_truck(&self, truck: EditableTruck) -> Result<Truck, Error> {
        let point = match validate(&truck) {
            Ok(point) => point,
            Err(err) => return Err(self.fail(err, DESC_CREATE)),
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_truck_in(&mut tx, &truck, point).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_truck_in(&self, tx: &mut Tx, truck: &EditableTruck, point: [f64; 2]) -> Result<Truck, Error> {
        let (road_id, municipality_id) = self.locate(tx, point).await?;
        let id = self.store().create_truck(tx, truck, road_id, municipality_id).await?;
        self.store().get_truck(tx, id).await
    }

    pub async fn list_trucks(&self, filter: TruckFilter) -> Result<Page<Truck>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_trucks(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_truck(&self, id: Uuid) -> Result<Truck, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_truck(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    /// Reducing `person_capacity` below the employee count of any route this
    /// truck serves is rejected. The check and the update run in one
    /// serializable transaction, retried on serialization failure.
    pub async fn patch_truck(&self, id: Uuid, patch: TruckPatch) -> Result<Truck, Error> {
        let invalid = [
            patch.make.as_ref().is_some_and(|m| m.is_empty() || m.len() > 50).then_some("make"),
            patch.model.as_ref().is_some_and(|m| m.is_empty() || m.len() > 50).then_some("model"),
            patch
                .license_plate
                .as_ref()
                .is_some_and(|p| p.is_empty() || p.len() > 16)
                .then_some("licensePlate"),
            patch.person_capacity.is_some_and(|c| c <= 0).then_some("personCapacity"),
        ];
        if let Some(field) = invalid.into_iter().flatten().next() {
            return Err(self.fail(Error::FieldInvalid(field), DESC_PATCH));
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
            let result = self.patch_truck_in(&mut tx, id, &patch, point).await;
            match self.finish(tx, result, DESC_PATCH).await {
                Err(err) if Self::should_retry(&err, attempt) => continue,
                outcome => return outcome,
            }
        }
    }

    async fn patch_truck_in(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &TruckPatch,
        point: Option<[f64; 2]>,
    ) -> Result<Truck, Error> {
        if let Some(person_capacity) = patch.person_capacity {
            let assigned = self.store().max_route_employee_count_for_truck(tx, id).await?;
            if i64::from(person_capacity) < assigned {
                return Err(Error::RouteTruckPersonCapacityMinLimit);
            }
        }

        let (road_id, municipality_id) = match point {
            Some(point) => self.locate(tx, point).await?,
            None => (None, None),
        };
        self.store().patch_truck(tx, id, patch, road_id, municipality_id).await?;
        self.store().get_truck(tx, id).await
    }

    /// Fails while the truck is still associated with a warehouse or a route.
    pub async fn delete_truck(&self, id: Uuid) -> Result<Truck, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_truck_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_truck_in(&self, tx: &mut Tx, id: Uuid) -> Result<Truck, Error> {
        let truck = self.store().get_truck(tx, id).await?;
        self.store().delete_truck(tx, id).await?;
        Ok(truck)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::{Error, TruckPatch};
    use crate::testing::MockStore;

    use super::super::Service;

    #[tokio::test]
    async fn shrinking_person_capacity_below_assignments_is_rejected() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(4);
        let route_id = store.add_route(truck_id);
        for _ in 0..3 {
            store.assign_employee(route_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = TruckPatch {
            person_capacity: Some(2),
            ..TruckPatch::default()
        };
        let err = service.patch_truck(truck_id, patch).await.unwrap_err();
        assert!(matches!(err, Error::RouteTruckPersonCapacityMinLimit));
        assert_eq!(store.truck_patches(), 0);
    }

    #[tokio::test]
    async fn shrinking_person_capacity_to_assignment_count_is_allowed() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(4);
        let route_id = store.add_route(truck_id);
        for _ in 0..3 {
            store.assign_employee(route_id);
        }

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = TruckPatch {
            person_capacity: Some(3),
            ..TruckPatch::default()
        };
        service.patch_truck(truck_id, patch).await.unwrap();
        assert_eq!(store.truck_patches(), 1);
    }

    #[tokio::test]
    async fn invalid_person_capacity_never_reaches_the_store() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(4);

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let patch = TruckPatch {
            person_capacity: Some(0),
            ..TruckPatch::default()
        };
        let err = service.patch_truck(truck_id, patch).await.unwrap_err();
        assert!(matches!(err, Error::FieldInvalid("personCapacity")));
        assert_eq!(store.truck_patches(), 0);
    }

    #[tokio::test]
    async fn deleting_a_truck_used_by_a_route_is_rejected() {
        let store = Arc::new(MockStore::new());
        let truck_id = store.add_truck(4);
        store.add_route(truck_id);

        let service = Service::new(AuthnService::with_fast_params(b"test-key"), store.clone());

        let err = service.delete_truck(truck_id).await.unwrap_err();
        assert!(matches!(err, Error::TruckAssociatedWithRoute));
        // The truck row is untouched.
        service.get_truck(truck_id).await.unwrap();
    }
}
