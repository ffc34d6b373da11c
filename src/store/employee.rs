use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{
    Credentials, EditableEmployee, Employee, EmployeeFilter, EmployeePatch, Error, Name, Page, Username,
};

use super::tx::Tx;
use super::{constraint, geometry_json, location_from_row, page_total, sort_column, unexpected};

const COLUMNS: &str = "e.id, e.username, e.first_name, e.last_name, e.role, \
                       ST_AsGeoJSON(e.geom) AS geojson, rn.way_name, m.name AS municipality_name, \
                       e.created_at, e.modified_at";

const JOINS: &str = "LEFT JOIN road_network rn ON rn.id = e.road_id \
                     LEFT JOIN municipalities m ON m.id = e.municipality_id";

fn from_row(row: &PgRow) -> Result<Employee, Error> {
    Ok(Employee {
        id: row.try_get("id").map_err(unexpected)?,
        username: Username(row.try_get("username").map_err(unexpected)?),
        first_name: Name(row.try_get("first_name").map_err(unexpected)?),
        last_name: Name(row.try_get("last_name").map_err(unexpected)?),
        role: row.try_get("role").map_err(unexpected)?,
        location: location_from_row(row)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

fn map_username_conflict(err: sqlx::Error) -> Error {
    match constraint(&err) {
        Some("employees_username_key") => Error::EmployeeAlreadyExists,
        _ => unexpected(err),
    }
}

pub(super) async fn create(
    tx: &mut Tx,
    employee: &EditableEmployee,
    password_hash: &str,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<Uuid, Error> {
    let geometry = geometry_json(&employee.geometry)?;

    let row = sqlx::query(
        "INSERT INTO employees (username, first_name, last_name, password, role, geom, road_id, municipality_id)
         VALUES ($1, $2, $3, $4, $5, ST_GeomFromGeoJSON($6), $7, $8)
         RETURNING id",
    )
    .bind(employee.username.as_str())
    .bind(employee.first_name.as_str())
    .bind(employee.last_name.as_str())
    .bind(password_hash)
    .bind(employee.role)
    .bind(geometry)
    .bind(road_id)
    .bind(municipality_id)
    .fetch_one(tx.conn()?)
    .await
    .map_err(map_username_conflict)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &EmployeeFilter) -> Result<Page<Employee>, Error> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {COLUMNS}, count(*) OVER() AS total FROM employees e {JOINS} WHERE true"
    ));

    if let Some(username) = &filter.username {
        query.push(" AND e.username ILIKE ").push_bind(format!("%{username}%"));
    }
    if let Some(first_name) = &filter.first_name {
        query.push(" AND e.first_name ILIKE ").push_bind(format!("%{first_name}%"));
    }
    if let Some(last_name) = &filter.last_name {
        query.push(" AND e.last_name ILIKE ").push_bind(format!("%{last_name}%"));
    }
    if let Some(role) = filter.role {
        query.push(" AND e.role = ").push_bind(role);
    }

    let sort = sort_column(filter.page.sort, "e.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<Employee, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM employees e {JOINS} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::EmployeeNotFound)?;

    from_row(&row)
}

pub(super) async fn get_by_username(tx: &mut Tx, username: &Username) -> Result<Employee, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM employees e {JOINS} WHERE e.username = $1"))
        .bind(username.as_str())
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::EmployeeNotFound)?;

    from_row(&row)
}

pub(super) async fn get_sign_in(tx: &mut Tx, username: &Username) -> Result<Credentials, Error> {
    let row = sqlx::query("SELECT username, password FROM employees WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::EmployeeNotFound)?;

    Ok(Credentials {
        username: Username(row.try_get("username").map_err(unexpected)?),
        password_hash: row.try_get("password").map_err(unexpected)?,
    })
}

pub(super) async fn patch(
    tx: &mut Tx,
    id: Uuid,
    patch: &EmployeePatch,
    road_id: Option<i64>,
    municipality_id: Option<i64>,
) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE employees SET modified_at = now()");

    if let Some(username) = &patch.username {
        query.push(", username = ").push_bind(username.as_str());
    }
    if let Some(first_name) = &patch.first_name {
        query.push(", first_name = ").push_bind(first_name.as_str());
    }
    if let Some(last_name) = &patch.last_name {
        query.push(", last_name = ").push_bind(last_name.as_str());
    }
    if let Some(geometry) = &patch.geometry {
        query.push(", geom = ST_GeomFromGeoJSON(").push_bind(geometry_json(geometry)?).push(")");
        query.push(", road_id = ").push_bind(road_id);
        query.push(", municipality_id = ").push_bind(municipality_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query
        .build()
        .execute(tx.conn()?)
        .await
        .map_err(map_username_conflict)?;

    if result.rows_affected() == 0 {
        return Err(Error::EmployeeNotFound);
    }
    Ok(())
}

pub(super) async fn update_password(tx: &mut Tx, username: &Username, password_hash: &str) -> Result<(), Error> {
    let result = sqlx::query("UPDATE employees SET password = $2, modified_at = now() WHERE username = $1")
        .bind(username.as_str())
        .bind(password_hash)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::EmployeeNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::EmployeeNotFound);
    }
    Ok(())
}
