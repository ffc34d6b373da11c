use sqlx::Row;

use crate::domain::{Error, Municipality, Road};

use super::tx::Tx;
use super::unexpected;

/// Search radius, in meters, for snapping a point to the road network.
const ROAD_SEARCH_RADIUS_METERS: f64 = 1000.0;

pub(super) async fn road_by_point(tx: &mut Tx, point: [f64; 2]) -> Result<Road, Error> {
    let row = sqlx::query(
        "SELECT id, way_name
         FROM road_network
         WHERE ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
         ORDER BY geom <-> ST_SetSRID(ST_MakePoint($1, $2), 4326)
         LIMIT 1",
    )
    .bind(point[0])
    .bind(point[1])
    .bind(ROAD_SEARCH_RADIUS_METERS)
    .fetch_optional(tx.conn()?)
    .await
    .map_err(unexpected)?
    .ok_or(Error::RoadNotFound)?;

    Ok(Road {
        id: row.try_get("id").map_err(unexpected)?,
        way_name: row.try_get("way_name").map_err(unexpected)?,
    })
}

pub(super) async fn municipality_by_point(tx: &mut Tx, point: [f64; 2]) -> Result<Municipality, Error> {
    let row = sqlx::query(
        "SELECT id, name
         FROM municipalities
         WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
         LIMIT 1",
    )
    .bind(point[0])
    .bind(point[1])
    .fetch_optional(tx.conn()?)
    .await
    .map_err(unexpected)?
    .ok_or(Error::MunicipalityNotFound)?;

    Ok(Municipality {
        id: row.try_get("id").map_err(unexpected)?,
        name: row.try_get("name").map_err(unexpected)?,
    })
}
