//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{Employee, EmployeeRole};
use sqlx::SqlitePool;

const EMPLOYEE_SELECT: &str = "SELECT id, username, display_name, hash_pass, role, is_active, created_at, updated_at FROM employee";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} ORDER BY created_at");
    let rows = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE username = ? COLLATE NOCASE LIMIT 1");
    let row = sqlx::query_as::<_, Employee>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM employee")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Row filter that refuses to touch the last active admin
///
/// Part of the same UPDATE/DELETE statement, so the count and the write are
/// one atomic step and two admins cannot demote each other at once.
const KEEPS_AN_ADMIN: &str = "(NOT (role = 'admin' AND is_active = 1) OR EXISTS (SELECT 1 FROM employee other WHERE other.role = 'admin' AND other.is_active = 1 AND other.id != employee.id))";

async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(n > 0)
}

/// Insert an employee; `hash_pass` must already be an argon2 PHC string
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    display_name: &str,
    hash_pass: &str,
    role: EmployeeRole,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO employee (id, username, display_name, hash_pass, role, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(username)
    .bind(display_name)
    .bind(hash_pass)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Username '{username}' already exists")),
        other => other,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

/// Partial update; `hash_pass` is the new hash when the password changes
///
/// With `protect_last_admin` the write is skipped (`Ok(None)`) when it would
/// hit the only active admin.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    display_name: Option<&str>,
    hash_pass: Option<&str>,
    role: Option<EmployeeRole>,
    is_active: Option<bool>,
    protect_last_admin: bool,
) -> RepoResult<Option<Employee>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE employee SET display_name = COALESCE(?1, display_name), hash_pass = COALESCE(?2, hash_pass), role = COALESCE(?3, role), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6 AND (?7 = 0 OR {KEEPS_AN_ADMIN})"
    );
    let rows = sqlx::query(&sql)
        .bind(display_name)
        .bind(hash_pass)
        .bind(role)
        .bind(is_active)
        .bind(now)
        .bind(id)
        .bind(protect_last_admin)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return if exists(pool, id).await? {
            Ok(None)
        } else {
            Err(RepoError::NotFound(format!("Employee {id} not found")))
        };
    }
    find_by_id(pool, id)
        .await?
        .map(Some)
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Delete unless it is the last active admin; `Ok(None)` when refused,
/// `Ok(Some(false))` when no such employee
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Option<bool>> {
    let sql = format!("DELETE FROM employee WHERE id = ? AND {KEEPS_AN_ADMIN}");
    let rows = sqlx::query(&sql).bind(id).execute(pool).await?;
    if rows.rows_affected() > 0 {
        return Ok(Some(true));
    }
    Ok(if exists(pool, id).await? { None } else { Some(false) })
}
