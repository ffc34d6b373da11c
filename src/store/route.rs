use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{EditableRoute, Error, Page, Route, RouteFilter, RouteName, RoutePatch};

use super::tx::Tx;
use super::{constraint, page_total, sort_column, unexpected};

const COLUMNS: &str = "r.id, r.name, r.truck_id, r.departure_warehouse_id, r.arrival_warehouse_id, \
                       r.created_at, r.modified_at";

fn from_row(row: &PgRow) -> Result<Route, Error> {
    Ok(Route {
        id: row.try_get("id").map_err(unexpected)?,
        name: RouteName(row.try_get("name").map_err(unexpected)?),
        truck_id: row.try_get("truck_id").map_err(unexpected)?,
        departure_warehouse_id: row.try_get("departure_warehouse_id").map_err(unexpected)?,
        arrival_warehouse_id: row.try_get("arrival_warehouse_id").map_err(unexpected)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

fn map_reference_error(err: sqlx::Error) -> Error {
    match constraint(&err) {
        Some("routes_truck_id_fkey") => Error::TruckNotFound,
        Some("routes_departure_warehouse_id_fkey") => Error::RouteDepartureWarehouseNotFound,
        Some("routes_arrival_warehouse_id_fkey") => Error::RouteArrivalWarehouseNotFound,
        _ => unexpected(err),
    }
}

pub(super) async fn create(tx: &mut Tx, route: &EditableRoute) -> Result<Uuid, Error> {
    let row = sqlx::query(
        "INSERT INTO routes (name, truck_id, departure_warehouse_id, arrival_warehouse_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(&route.name.0)
    .bind(route.truck_id)
    .bind(route.departure_warehouse_id)
    .bind(route.arrival_warehouse_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(map_reference_error)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &RouteFilter) -> Result<Page<Route>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM routes r WHERE true"
    ));

    if let Some(name) = &filter.name {
        query.push(" AND r.name ILIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(truck_id) = filter.truck_id {
        query.push(" AND r.truck_id = ").push_bind(truck_id);
    }
    if let Some(departure_warehouse_id) = filter.departure_warehouse_id {
        query.push(" AND r.departure_warehouse_id = ").push_bind(departure_warehouse_id);
    }
    if let Some(arrival_warehouse_id) = filter.arrival_warehouse_id {
        query.push(" AND r.arrival_warehouse_id = ").push_bind(arrival_warehouse_id);
    }

    let sort = sort_column(filter.page.sort, "r.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<Route, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM routes r WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::RouteNotFound)?;

    from_row(&row)
}

pub(super) async fn patch(tx: &mut Tx, id: Uuid, patch: &RoutePatch) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE routes SET modified_at = now()");

    if let Some(name) = &patch.name {
        query.push(", name = ").push_bind(&name.0);
    }
    if let Some(truck_id) = patch.truck_id {
        query.push(", truck_id = ").push_bind(truck_id);
    }
    if let Some(departure_warehouse_id) = patch.departure_warehouse_id {
        query.push(", departure_warehouse_id = ").push_bind(departure_warehouse_id);
    }
    if let Some(arrival_warehouse_id) = patch.arrival_warehouse_id {
        query.push(", arrival_warehouse_id = ").push_bind(arrival_warehouse_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(tx.conn()?).await.map_err(map_reference_error)?;

    if result.rows_affected() == 0 {
        return Err(Error::RouteNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM routes WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::RouteNotFound);
    }
    Ok(())
}
