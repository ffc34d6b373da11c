use uuid::Uuid;

use crate::domain::{Container, Error, Page, RouteContainerFilter};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create route container";
const DESC_LIST: &str = "service: failed to list route containers";
const DESC_DELETE: &str = "service: failed to delete route container";

impl Service {
    pub async fn create_route_container(&self, route_id: Uuid, container_id: Uuid) -> Result<Container, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_route_container_in(&mut tx, route_id, container_id).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_route_container_in(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        container_id: Uuid,
    ) -> Result<Container, Error> {
        self.store().create_route_container(tx, route_id, container_id).await?;
        self.store().get_container(tx, container_id).await
    }

    pub async fn list_route_containers(
        &self,
        route_id: Uuid,
        filter: RouteContainerFilter,
    ) -> Result<Page<Container>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.list_route_containers_in(&mut tx, route_id, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    async fn list_route_containers_in(
        &self,
        tx: &mut Tx,
        route_id: Uuid,
        filter: &RouteContainerFilter,
    ) -> Result<Page<Container>, Error> {
        self.store().get_route(tx, route_id).await?;
        self.store().list_route_containers(tx, route_id, filter).await
    }

    pub async fn delete_route_container(&self, route_id: Uuid, container_id: Uuid) -> Result<(), Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.store().delete_route_container(&mut tx, route_id, container_id).await;
        self.finish(tx, result, DESC_DELETE).await
    }
}
