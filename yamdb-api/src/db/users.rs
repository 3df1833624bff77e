//! User repository queries

use sqlx::SqlitePool;
use yamdb_common::db::models::{Role, User};
use yamdb_common::error::{Error, Result};

const USER_COLUMNS: &str =
    "guid, username, email, first_name, last_name, bio, role, is_staff, is_superuser";

type UserRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
    i64,
);

fn row_to_user(row: UserRow) -> User {
    User {
        guid: row.0,
        username: row.1,
        email: row.2,
        first_name: row.3,
        last_name: row.4,
        bio: row.5,
        role: Role::parse(&row.6).unwrap_or_default(),
        is_staff: row.7 != 0,
        is_superuser: row.8 != 0,
    }
}

pub async fn get_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE guid = ?", USER_COLUMNS))
            .bind(guid)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(row_to_user))
}

pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_user))
}

pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(row_to_user))
}

/// List users ordered by username with optional substring search
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<User>)> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR username LIKE '%' || ?1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    let rows: Vec<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users
         WHERE (?1 IS NULL OR username LIKE '%' || ?1 || '%')
         ORDER BY username LIMIT ?2 OFFSET ?3",
        USER_COLUMNS
    ))
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((count, rows.into_iter().map(row_to_user).collect()))
}

/// Insert a new user. Duplicate username or email surfaces as Conflict
/// straight from the store's UNIQUE constraints.
pub async fn insert(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        "INSERT INTO users (guid, username, email, first_name, last_name, bio, role)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.guid)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.bio)
    .bind(user.role.as_str())
    .execute(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Conflict("A user with this username or email already exists".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    Ok(())
}

/// Partial update; absent fields stay unchanged
#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

pub async fn update(pool: &SqlitePool, guid: &str, patch: &UserPatch) -> Result<()> {
    sqlx::query(
        "UPDATE users SET
            username = COALESCE(?, username),
            email = COALESCE(?, email),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            bio = COALESCE(?, bio),
            role = COALESCE(?, role)
         WHERE guid = ?",
    )
    .bind(&patch.username)
    .bind(&patch.email)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.bio)
    .bind(patch.role.map(|r| r.as_str()))
    .bind(guid)
    .execute(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Conflict("A user with this username or email already exists".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    Ok(())
}

/// Delete by username; false when no such user existed
pub async fn delete(pool: &SqlitePool, username: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Overwrite the live confirmation code for a user
pub async fn set_confirmation_code(pool: &SqlitePool, guid: &str, code: &str) -> Result<()> {
    sqlx::query("UPDATE users SET confirmation_code = ? WHERE guid = ?")
        .bind(code)
        .bind(guid)
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch the stored confirmation code (None when never issued or consumed)
pub async fn get_confirmation_code(pool: &SqlitePool, guid: &str) -> Result<Option<String>> {
    let code: Option<Option<String>> =
        sqlx::query_scalar("SELECT confirmation_code FROM users WHERE guid = ?")
            .bind(guid)
            .fetch_optional(pool)
            .await?;
    Ok(code.flatten())
}

/// Invalidate the code once consumed
pub async fn clear_confirmation_code(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE users SET confirmation_code = NULL WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;
    Ok(())
}
