use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{EditableTruck, Error, Page, Truck, TruckFilter, TruckPatch};

use super::tx::Tx;
use super::{constraint, geometry_json, location_from_row, page_total, sort_column, unexpected};

const COLUMNS: &str = "t.id, t.make, t.model, t.license_plate, t.person_capacity, \
                       ST_AsGeoJSON(t.geom) AS geojson, rn.way_name, m.name AS municipality_name, \
                       t.created_at, t.modified_at";

const JOINS: &str = "LEFT JOIN road_network rn ON rn.id = t.road_id \
                     LEFT JOIN municipalities m ON m.id = t.municipality_id";

pub(super) fn from_row(row: &PgRow) -> Result<Truck, Error> {
    Ok(Truck {
        id: row.try_get("id").map_err(unexpected)?,
        make: row.try_get("make").map_err(unexpected)?,
        model: row.try_get("model").map_err(unexpected)?,
        license_plate: row.try_get("license_plate").map_err(unexpected)?,
        person_capacity: row.try_get("person_capacity").map_err(unexpected)?,
        location: location_from_row(row)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

pub(super) async fn create(
    tx: &mut Tx,
    truck: &EditableTruck,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<Uuid, Error> {
    let geometry = geometry_json(&truck.geometry)?;

    let row = sqlx::query(
        "INSERT INTO trucks (make, model, license_plate, person_capacity, geom, road_id, municipality_id)
         VALUES ($1, $2, $3, $4, ST_GeomFromGeoJSON($5), $6, $7)
         RETURNING id",
    )
    .bind(&truck.make)
    .bind(&truck.model)
    .bind(&truck.license_plate)
    .bind(truck.person_capacity)
    .bind(geometry)
    .bind(road_id)
    .bind(municipality_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(unexpected)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &TruckFilter) -> Result<Page<Truck>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM trucks t {JOINS} WHERE true"
    ));

    if let Some(make) = &filter.make {
        query.push(" AND t.make ILIKE ").push_bind(format!("%{make}%"));
    }
    if let Some(model) = &filter.model {
        query.push(" AND t.model ILIKE ").push_bind(format!("%{model}%"));
    }
    if let Some(license_plate) = &filter.license_plate {
        query.push(" AND t.license_plate ILIKE ").push_bind(format!("%{license_plate}%"));
    }
    if let Some(location_name) = &filter.location_name {
        let pattern = format!("%{location_name}%");
        query
            .push(" AND (rn.way_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    let sort = sort_column(filter.page.sort, "t.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<Truck, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM trucks t {JOINS} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::TruckNotFound)?;

    from_row(&row)
}

pub(super) async fn patch(
    tx: &mut Tx,
    id: Uuid,
    patch: &TruckPatch,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE trucks SET modified_at = now()");

    if let Some(make) = &patch.make {
        query.push(", make = ").push_bind(make);
    }
    if let Some(model) = &patch.model {
        query.push(", model = ").push_bind(model);
    }
    if let Some(license_plate) = &patch.license_plate {
        query.push(", license_plate = ").push_bind(license_plate);
    }
    if let Some(person_capacity) = patch.person_capacity {
        query.push(", person_capacity = ").push_bind(person_capacity);
    }
    if let Some(geometry) = &patch.geometry {
        query.push(", geom = ST_GeomFromGeoJSON(").push_bind(geometry_json(geometry)?).push(")");
        query.push(", road_id = ").push_bind(road_id);
        query.push(", municipality_id = ").push_bind(municipality_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(tx.conn()?).await.map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::TruckNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM trucks WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(|err| match constraint(&err) {
            Some("warehouse_trucks_truck_id_fkey") => Error::TruckAssociatedWithWarehouse,
            Some("routes_truck_id_fkey") => Error::TruckAssociatedWithRoute,
            _ => unexpected(err),
        })?;

    if result.rows_affected() == 0 {
        return Err(Error::TruckNotFound);
    }
    Ok(())
}
