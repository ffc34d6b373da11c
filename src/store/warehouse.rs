use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{EditableWarehouse, Error, Page, Warehouse, WarehouseFilter, WarehousePatch};

use super::tx::Tx;
use super::{constraint, geometry_json, location_from_row, page_total, sort_column, unexpected};

const COLUMNS: &str = "w.id, w.truck_capacity, ST_AsGeoJSON(w.geom) AS geojson, \
                       rn.way_name, m.name AS municipality_name, w.created_at, w.modified_at";

const JOINS: &str = "LEFT JOIN road_network rn ON rn.id = w.road_id \
                     LEFT JOIN municipalities m ON m.id = w.municipality_id";

fn from_row(row: &PgRow) -> Result<Warehouse, Error> {
    Ok(Warehouse {
        id: row.try_get("id").map_err(unexpected)?,
        truck_capacity: row.try_get("truck_capacity").map_err(unexpected)?,
        location: location_from_row(row)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

pub(super) async fn create(
    tx: &mut Tx,
    warehouse: &EditableWarehouse,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<Uuid, Error> {
    let geometry = geometry_json(&warehouse.geometry)?;

    let row = sqlx::query(
        "INSERT INTO warehouses (truck_capacity, geom, road_id, municipality_id)
         VALUES ($1, ST_GeomFromGeoJSON($2), $3, $4)
         RETURNING id",
    )
    .bind(warehouse.truck_capacity)
    .bind(geometry)
    .bind(road_id)
    .bind(municipality_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(unexpected)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &WarehouseFilter) -> Result<Page<Warehouse>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM warehouses w {JOINS} WHERE true"
    ));

    if let Some(location_name) = &filter.location_name {
        let pattern = format!("%{location_name}%");
        query
            .push(" AND (rn.way_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    let sort = sort_column(filter.page.sort, "w.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<Warehouse, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM warehouses w {JOINS} WHERE w.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::WarehouseNotFound)?;

    from_row(&row)
}

pub(super) async fn patch(
    tx: &mut Tx,
    id: Uuid,
    patch: &WarehousePatch,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE warehouses SET modified_at = now()");

    if let Some(truck_capacity) = patch.truck_capacity {
        query.push(", truck_capacity = ").push_bind(truck_capacity);
    }
    if let Some(geometry) = &patch.geometry {
        query.push(", geom = ST_GeomFromGeoJSON(").push_bind(geometry_json(geometry)?).push(")");
        query.push(", road_id = ").push_bind(road_id);
        query.push(", municipality_id = ").push_bind(municipality_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(tx.conn()?).await.map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::WarehouseNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(|err| match constraint(&err) {
            Some("warehouse_trucks_warehouse_id_fkey") => Error::WarehouseAssociatedWithTruck,
            Some("routes_departure_warehouse_id_fkey") => Error::WarehouseAssociatedWithRouteDeparture,
            Some("routes_arrival_warehouse_id_fkey") => Error::WarehouseAssociatedWithRouteArrival,
            _ => unexpected(err),
        })?;

    if result.rows_affected() == 0 {
        return Err(Error::WarehouseNotFound);
    }
    Ok(())
}
