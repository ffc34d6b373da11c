use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{
    Employee, Error, Name, Page, RouteEmployee, RouteEmployeeFilter, RouteRole, Username,
};

use super::tx::Tx;
use super::{constraint, location_from_row, page_total, sort_column, unexpected};

const COLUMNS: &str = "e.id, e.username, e.first_name, e.last_name, e.role, re.route_role, \
                       ST_AsGeoJSON(e.geom) AS geojson, rn.way_name, m.name AS municipality_name, \
                       e.created_at, e.modified_at";

const JOINS: &str = "JOIN employees e ON e.id = re.employee_id \
                     LEFT JOIN road_network rn ON rn.id = e.road_id \
                     LEFT JOIN municipalities m ON m.id = e.municipality_id";

fn from_row(row: &PgRow) -> Result<RouteEmployee, Error> {
    Ok(RouteEmployee {
        employee: Employee {
            id: row.try_get("id").map_err(unexpected)?,
            username: Username(row.try_get("username").map_err(unexpected)?),
            first_name: Name(row.try_get("first_name").map_err(unexpected)?),
            last_name: Name(row.try_get("last_name").map_err(unexpected)?),
            role: row.try_get("role").map_err(unexpected)?,
            location: location_from_row(row)?,
            created_at: row.try_get("created_at").map_err(unexpected)?,
            modified_at: row.try_get("modified_at").map_err(unexpected)?,
        },
        route_role: row.try_get("route_role").map_err(unexpected)?,
    })
}

pub(super) async fn create(tx: &mut Tx, route_id: Uuid, employee_id: Uuid, role: RouteRole) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO route_employees (route_id, employee_id, route_role)
         VALUES ($1, $2, $3)",
    )
    .bind(route_id)
    .bind(employee_id)
    .bind(role)
    .execute(tx.conn()?)
    .await
    .map_err(|err| match constraint(&err) {
        Some("route_employees_pkey") => Error::RouteEmployeeAlreadyExists,
        Some("route_employees_route_id_fkey") => Error::RouteNotFound,
        Some("route_employees_employee_id_fkey") => Error::EmployeeNotFound,
        _ => unexpected(err),
    })?;

    Ok(())
}

pub(super) async fn list(
    tx: &mut Tx,
    route_id: Uuid,
    filter: &RouteEmployeeFilter,
) -> Result<Page<RouteEmployee>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM route_employees re {JOINS} WHERE re.route_id = "
    ));
    query.push_bind(route_id);

    if let Some(route_role) = filter.route_role {
        query.push(" AND re.route_role = ").push_bind(route_role);
    }

    let sort = sort_column(filter.page.sort, "re.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn delete(tx: &mut Tx, route_id: Uuid, employee_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM route_employees WHERE route_id = $1 AND employee_id = $2")
        .bind(route_id)
        .bind(employee_id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::RouteEmployeeNotFound);
    }
    Ok(())
}

pub(super) async fn count(tx: &mut Tx, route_id: Uuid) -> Result<i64, Error> {
    let row = sqlx::query("SELECT count(*) AS count FROM route_employees WHERE route_id = $1")
        .bind(route_id)
        .fetch_one(tx.conn()?)
        .await
        .map_err(unexpected)?;

    row.try_get("count").map_err(unexpected)
}

/// Largest employee count among the routes assigned to a truck, zero when
/// the truck has no routes.
pub(super) async fn max_count_for_truck(tx: &mut Tx, truck_id: Uuid) -> Result<i64, Error> {
    let row = sqlx::query(
        "SELECT coalesce(max(per_route.count), 0) AS count
         FROM (
             SELECT count(*) AS count
             FROM route_employees re
             JOIN routes r ON r.id = re.route_id
             WHERE r.truck_id = $1
             GROUP BY re.route_id
         ) AS per_route",
    )
    .bind(truck_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(unexpected)?;

    row.try_get("count").map_err(unexpected)
}
