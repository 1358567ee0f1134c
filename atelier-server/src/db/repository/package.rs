//! Package Repository

use super::{RepoError, RepoResult};
use shared::models::{Package, PackageCreate, PackageUpdate};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const PACKAGE_SELECT: &str = "SELECT id, name, description, price, inclusions, image, is_active, created_at, updated_at FROM package";

pub async fn find_all(pool: &SqlitePool, active_only: bool) -> RepoResult<Vec<Package>> {
    let sql = if active_only {
        format!("{PACKAGE_SELECT} WHERE is_active = 1 ORDER BY name")
    } else {
        format!("{PACKAGE_SELECT} ORDER BY name")
    };
    let rows = sqlx::query_as::<_, Package>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Package>> {
    let mut conn = pool.acquire().await?;
    find_in(&mut conn, id).await
}

/// Read inside the caller's transaction
pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Package>> {
    let sql = format!("{PACKAGE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Package>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: PackageCreate) -> RepoResult<Package> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO package (id, name, description, price, inclusions, image, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(Json(&data.inclusions))
    .bind(&data.image)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create package".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: PackageUpdate) -> RepoResult<Package> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE package SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), inclusions = COALESCE(?4, inclusions), image = COALESCE(?5, image), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.price)
    .bind(data.inclusions.map(Json))
    .bind(data.image)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Package {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Package {id} not found")))
}

/// Soft delete
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE package SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
