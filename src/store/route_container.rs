use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::domain::{Container, Error, Page, RouteContainerFilter};

use super::tx::Tx;
use super::{constraint, container, page_total, sort_column, unexpected};

const COLUMNS: &str = "c.id, c.category, ST_AsGeoJSON(c.geom) AS geojson, \
                       rn.way_name, m.name AS municipality_name, c.created_at, c.modified_at";

const JOINS: &str = "JOIN containers c ON c.id = rc.container_id \
                     LEFT JOIN road_network rn ON rn.id = c.road_id \
                     LEFT JOIN municipalities m ON m.id = c.municipality_id";

pub(super) async fn create(tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error> {
    sqlx::query("INSERT INTO route_containers (route_id, container_id) VALUES ($1, $2)")
        .bind(route_id)
        .bind(container_id)
        .execute(tx.conn()?)
        .await
        .map_err(|err| match constraint(&err) {
            Some("route_containers_pkey") => Error::RouteContainerAlreadyExists,
            Some("route_containers_route_id_fkey") => Error::RouteNotFound,
            Some("route_containers_container_id_fkey") => Error::ContainerNotFound,
            _ => unexpected(err),
        })?;

    Ok(())
}

pub(super) async fn list(
    tx: &mut Tx,
    route_id: Uuid,
    filter: &RouteContainerFilter,
) -> Result<Page<Container>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM route_containers rc {JOINS} WHERE rc.route_id = "
    ));
    query.push_bind(route_id);

    let sort = sort_column(filter.page.sort, "rc.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(container::from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn delete(tx: &mut Tx, route_id: Uuid, container_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM route_containers WHERE route_id = $1 AND container_id = $2")
        .bind(route_id)
        .bind(container_id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::RouteContainerNotFound);
    }
    Ok(())
}
