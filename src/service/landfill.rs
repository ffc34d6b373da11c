use uuid::Uuid;

use crate::domain::{EditableLandfill, Error, Landfill, LandfillFilter, LandfillPatch, Page};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create landfill";
const DESC_LIST: &str = "service: failed to list landfills";
const DESC_GET: &str = "service: failed to get landfill";
const DESC_PATCH: &str = "service: failed to patch landfill";
const DESC_DELETE: &str = "service: failed to delete landfill";

impl Service {
    pub async fn create_landfill(&self, landfill: EditableLandfill) -> Result<Landfill, Error> {
        let point = match landfill.geometry.as_point() {
            Some(point) => point,
            None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_CREATE)),
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_landfill_in(&mut tx, &landfill, point).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_landfill_in(
        &self,
        tx: &mut Tx,
        landfill: &EditableLandfill,
        point: [f64; 2],
    ) -> Result<Landfill, Error> {
        let (road_id, municipality_id) = self.locate(tx, point).await?;
        let id = self.store().create_landfill(tx, landfill, road_id, municipality_id).await?;
        self.store().get_landfill(tx, id).await
    }

    pub async fn list_landfills(&self, filter: LandfillFilter) -> Result<Page<Landfill>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_landfills(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_landfill(&self, id: Uuid) -> Result<Landfill, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_landfill(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    pub async fn patch_landfill(&self, id: Uuid, patch: LandfillPatch) -> Result<Landfill, Error> {
        let point = match &patch.geometry {
            Some(geometry) => match geometry.as_point() {
                Some(point) => Some(point),
                None => return Err(self.fail(Error::FieldInvalid("geometry"), DESC_PATCH)),
            },
            None => None,
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
        let result = self.patch_landfill_in(&mut tx, id, &patch, point).await;
        self.finish(tx, result, DESC_PATCH).await
    }

    async fn patch_landfill_in(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &LandfillPatch,
        point: Option<[f64; 2]>,
    ) -> Result<Landfill, Error> {
        let (road_id, municipality_id) = match point {
            Some(point) => self.locate(tx, point).await?,
            None => (None, None),
        };
        self.store().patch_landfill(tx, id, patch, road_id, municipality_id).await?;
        self.store().get_landfill(tx, id).await
    }

    pub async fn delete_landfill(&self, id: Uuid) -> Result<Landfill, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_landfill_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_landfill_in(&self, tx: &mut Tx, id: Uuid) -> Result<Landfill, Error> {
        let landfill = self.store().get_landfill(tx, id).await?;
        self.store().delete_landfill(tx, id).await?;
        Ok(landfill)
    }
}
