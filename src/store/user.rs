use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::{Credentials, EditableUser, Error, Name, Page, User, UserFilter, UserPatch, Username};

use super::tx::Tx;
use super::{constraint, page_total, sort_column, unexpected};

const COLUMNS: &str = "u.id, u.username, u.first_name, u.last_name, u.created_at, u.modified_at";

fn from_row(row: &PgRow) -> Result<User, Error> {
    Ok(User {
        id: row.try_get("id").map_err(unexpected)?,
        username: Username(row.try_get("username").map_err(unexpected)?),
        first_name: Name(row.try_get("first_name").map_err(unexpected)?),
        last_name: Name(row.try_get("last_name").map_err(unexpected)?),
        created_at: row.try_get("created_at").map_err(unexpected)?,
        modified_at: row.try_get("modified_at").map_err(unexpected)?,
    })
}

fn map_username_conflict(err: sqlx::Error) -> Error {
    match constraint(&err) {
        Some("users_username_key") => Error::UserAlreadyExists,
        _ => unexpected(err),
    }
}

pub(super) async fn create(tx: &mut Tx, user: &EditableUser, password_hash: &str) -> Result<Uuid, Error> {
    let row = sqlx::query(
        "INSERT INTO users (username, first_name, last_name, password)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(user.username.as_str())
    .bind(user.first_name.as_str())
    .bind(user.last_name.as_str())
    .bind(password_hash)
    .fetch_one(tx.conn()?)
    .await
    .map_err(map_username_conflict)?;

    row.try_get("id").map_err(unexpected)
}

pub(super) async fn list(tx: &mut Tx, filter: &UserFilter) -> Result<Page<User>, Error> {
    let mut query = QueryBuilder::new(format!("SELECT {COLUMNS}, count(*) OVER() AS total FROM users u WHERE true"));

    if let Some(username) = &filter.username {
        query.push(" AND u.username ILIKE ").push_bind(format!("%{username}%"));
    }
    if let Some(first_name) = &filter.first_name {
        query.push(" AND u.first_name ILIKE ").push_bind(format!("%{first_name}%"));
    }
    if let Some(last_name) = &filter.last_name {
        query.push(" AND u.last_name ILIKE ").push_bind(format!("%{last_name}%"));
    }

    let sort = sort_column(filter.page.sort, "u.created_at");
    query.push(format!(" ORDER BY {sort} {}", filter.page.order.sql()));
    query.push(" LIMIT ").push_bind(filter.page.limit);
    query.push(" OFFSET ").push_bind(filter.page.offset);

    let rows = query.build().fetch_all(tx.conn()?).await.map_err(unexpected)?;

    Ok(Page {
        total: page_total(&rows)?,
        results: rows.iter().map(from_row).collect::<Result<_, _>>()?,
    })
}

pub(super) async fn get(tx: &mut Tx, id: Uuid) -> Result<User, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users u WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::UserNotFound)?;

    from_row(&row)
}

pub(super) async fn get_by_username(tx: &mut Tx, username: &Username) -> Result<User, Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users u WHERE u.username = $1"))
        .bind(username.as_str())
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::UserNotFound)?;

    from_row(&row)
}

pub(super) async fn get_sign_in(tx: &mut Tx, username: &Username) -> Result<Credentials, Error> {
    let row = sqlx::query("SELECT username, password FROM users WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(tx.conn()?)
        .await
        .map_err(unexpected)?
        .ok_or(Error::UserNotFound)?;

    Ok(Credentials {
        username: Username(row.try_get("username").map_err(unexpected)?),
        password_hash: row.try_get("password").map_err(unexpected)?,
    })
}

pub(super) async fn patch(tx: &mut Tx, id: Uuid, patch: &UserPatch) -> Result<(), Error> {
    let mut query = QueryBuilder::new("UPDATE users SET modified_at = now()");

    if let Some(username) = &patch.username {
        query.push(", username = ").push_bind(username.as_str());
    }
    if let Some(first_name) = &patch.first_name {
        query.push(", first_name = ").push_bind(first_name.as_str());
    }
    if let Some(last_name) = &patch.last_name {
        query.push(", last_name = ").push_bind(last_name.as_str());
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query
        .build()
        .execute(tx.conn()?)
        .await
        .map_err(map_username_conflict)?;

    if result.rows_affected() == 0 {
        return Err(Error::UserNotFound);
    }
    Ok(())
}

pub(super) async fn update_password(tx: &mut Tx, username: &Username, password_hash: &str) -> Result<(), Error> {
    let result = sqlx::query("UPDATE users SET password = $2, modified_at = now() WHERE username = $1")
        .bind(username.as_str())
        .bind(password_hash)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::UserNotFound);
    }
    Ok(())
}

pub(super) async fn delete(tx: &mut Tx, id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(tx.conn()?)
        .await
        .map_err(unexpected)?;

    if result.rows_affected() == 0 {
        return Err(Error::UserNotFound);
    }
    Ok(())
}
