use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{Container, ContainerFilter, ContainerPatch, EditableContainer, Error, Page};

use super::tx::Tx;
use super::{constraint, geometry_json, location_from_row, page_total, sort_column, unexpected};

const COLUMNS: &str = "c.id, c.category, ST_AsGeoJSON(c.geom) AS geojson, \
                       rn.way_name, m.name AS municipality_name, c.created_at, c.modified_at";

const JOINS: &str = "LEFT JOIN road_network rn ON rn.id = c.road_id \
                     LEFT JOIN municipalities m ON m.id = c.municipality_id";

pub(super) fn from_row(row: &PgRow) -> Result<Container, Error> {
    Ok(Container {
        id: row.try_get("id").map_err(unexpected)?,
        category: row.try_get("category").map_err(unexpected)?,
        location: location_from_row(row)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

pub(super) async fn create(
    tx: &mut Tx,
    container: &EditableContainer,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<Uuid, Error> {
    let geometry = geometry_json(&container.geometry)?;

    let row = sqlx::query(
        "INSERT INTO containers (category, geom, road_id, municipality_id)
         VALUES ($1, ST_GeomFromGeoJSON($2), $3, $4)
         RETURNING id",
    )
    .bind(container.category)
    .bind(geometry)
    .bind(road_id)
    .bind(municipality_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(unexpected)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &ContainerFilter) -> Result<Page<Container>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM containers c {JOINS} WHERE true"
    ));

    if let Some(category) = filter.category {
        query.push(" AND c.category = ").push_bind(category);
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

    let sort = sort_column(filter.page.sort, "c.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<Container, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM containers c {JOINS} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::ContainerNotFound)?;

    from_row(&row)
}

pub(super) async fn patch(
    tx: &mut Tx,
    id: Uuid,
    patch: &ContainerPatch,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE containers SET modified_at = now()");

    if let Some(category) = patch.category {
        query.push(", category = ").push_bind(category);
    }
    if let Some(geometry) = &patch.geometry {
        query.push(", geom = ST_GeomFromGeoJSON(").push_bind(geometry_json(geometry)?).push(")");
        query.push(", road_id = ").push_bind(road_id);
        query.push(", municipality_id = ").push_bind(municipality_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(tx.conn()?).await.map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::ContainerNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM containers WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(|err| match constraint(&err) {
            Some("route_containers_container_id_fkey") => Error::ContainerAssociatedWithRoute,
            _ => unexpected(err),
        })?;

    if result.rows_affected() == 0 {
        return Err(Error::ContainerNotFound);
    }
    Ok(())
}
