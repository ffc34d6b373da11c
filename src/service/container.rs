use uuid::Uuid;

use crate::domain::{Container, ContainerFilter, ContainerPatch, EditableContainer, Error, Page};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create container";
const DESC_LIST: &str = "service: failed to list containers";
const DESC_GET: &str = "service: failed to get container";
const DESC_PATCH: &str = "service: failed to patch container";
const DESC_DELETE: &str = "service: failed to delete container";

impl Service {
    pub async fn create_container(&self, container: EditableContainer) -> Result<Container, Error> {
        let point = match container.geometry.as_point() {
            Some(point) => point,
            None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_CREATE)),
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_container_in(&mut tx, &container, point).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_container_in(
        &self,
        tx: &mut Tx,
        container: &EditableContainer,
        point: [f64; 2],
    ) -> Result<Container, Error> {
        let (road_id, municipality_id) = self.locate(tx, point).await?;
        let id = self.store().create_container(tx, container, road_id, municipality_id).await?;
        self.store().get_container(tx, id).await
    }

    pub async fn list_containers(&self, filter: ContainerFilter) -> Result<Page<Container>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_containers(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_container(&self, id: Uuid) -> Result<Container, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_container(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    pub async fn patch_container(&self, id: Uuid, patch: ContainerPatch) -> Result<Container, Error> {
        let point = match &patch.geometry {
            Some(geometry) => match geometry.as_point() {
                Some(point) => Some(point),
                None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_PATCH)),
            },
            None => None,
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
        let result = self.patch_container_in(&mut tx, id, &patch, point).await;
        self.finish(tx, result, DESC_PATCH).await
    }

    async fn patch_container_in(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &ContainerPatch,
        point: Option<[f64; 2]>,
    ) -> Result<Container, Error> {
        let (road_id, municipality_id) = match point {
            Some(point) => self.locate(tx, point).await?,
            None => (None, None),
        };
        self.store().patch_container(tx, id, patch, road_id, municipality_id).await?;
        self.store().get_container(tx, id).await
    }

    /// Fails with `ContainerAssociatedWithRoute` while any route still
    /// collects this container.
    pub async fn delete_container(&self, id: Uuid) -> Result<Container, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_container_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_container_in(&self, tx: &mut Tx, id: Uuid) -> Result<Container, Error> {
        let container = self.store().get_container(tx, id).await?;
        self.store().delete_container(tx, id).await?;
        Ok(container)
    }
}
