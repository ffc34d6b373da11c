use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{Error, Page, Truck, WarehouseTruckFilter};

use super::tx::Tx;
use super::{constraint, page_total, sort_column, truck, unexpected};

const COLUMNS: &str = "t.id, t.make, t.model, t.license_plate, t.person_capacity, \
                       ST_AsGeoJSON(t.geom) AS geojson, rn.way_name, m.name AS municipality_name, \
                       t.created_at, t.modified_at";

const JOINS: &str = "JOIN trucks t ON t.id = wt.truck_id \
                     LEFT JOIN road_network rn ON rn.id = t.road_id \
                     LEFT JOIN municipalities m ON m.id = t.municipality_id";

pub(super) async fn create(tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
    sqlx::query("INSERT INTO warehouse_trucks (warehouse_id, truck_id) VALUES ($1, $2)")
        .bind(warehouse_id)
        .bind(truck_id)
        .execute(tx.conn()?)
        .await
        .map_err(|err| match constraint(&err) {
            Some("warehouse_trucks_pkey") => Error::WarehouseTruckAlreadyExists,
            Some("warehouse_trucks_warehouse_id_fkey") => Error::WarehouseNotFound,
            Some("warehouse_trucks_truck_id_fkey") => Error::TruckNotFound,
            _ => unexpected(err),
        })?;

    Ok(())
}

pub(super) async fn list(
    tx: &mut Tx,
    warehouse_id: Uuid,
    filter: &WarehouseTruckFilter,
) -> Result<Page<Truck>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM warehouse_trucks wt {JOINS} WHERE wt.warehouse_id = "
    ));
    query.push_bind(warehouse_id);

    let sort = sort_column(filter.page.sort, "wt.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(truck::from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn delete(tx: &mut Tx, warehouse_id: Uuid, truck_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM warehouse_trucks WHERE warehouse_id = $1 AND truck_id = $2")
        .bind(warehouse_id)
        .bind(truck_id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::WarehouseTruckNotFound);
    }
    Ok(())
}

pub(super) async fn count(tx: &mut Tx, warehouse_id: Uuid) -> Result<i64, Error> {
    let row = sqlx::query("SELECT count(*) AS count FROM warehouse_trucks WHERE warehouse_id = $1")
        .bind(warehouse_id)
        .fetch_one(tx.conn()?)
        .await
        .map_err(unexpected)?;

    row.try_get("count").map_err(unexpected)
}
