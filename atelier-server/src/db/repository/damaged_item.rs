//! Damaged Item Repository

use super::RepoResult;
use shared::models::{DamageStatus, DamagedItem};
use sqlx::{SqliteConnection, SqlitePool};

const DAMAGED_SELECT: &str = "SELECT d.id, d.rental_id, r.reference_code AS rental_reference, d.item_id, i.name AS item_name, d.variation_id, v.color, v.size, d.quantity, d.notes, d.status, d.created_at, d.resolved_at FROM damaged_item d JOIN rental r ON r.id = d.rental_id JOIN item i ON i.id = d.item_id JOIN item_variation v ON v.id = d.variation_id";

pub async fn list(pool: &SqlitePool, status: Option<DamageStatus>) -> RepoResult<Vec<DamagedItem>> {
    let sql = format!("{DAMAGED_SELECT} WHERE (?1 IS NULL OR d.status = ?1) ORDER BY d.created_at DESC");
    let rows = sqlx::query_as::<_, DamagedItem>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_rental(
    conn: &mut SqliteConnection,
    rental_id: i64,
) -> RepoResult<Vec<DamagedItem>> {
    let sql = format!("{DAMAGED_SELECT} WHERE d.rental_id = ? ORDER BY d.created_at, d.id");
    let rows = sqlx::query_as::<_, DamagedItem>(&sql)
        .bind(rental_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<DamagedItem>> {
    let sql = format!("{DAMAGED_SELECT} WHERE d.id = ?");
    let row = sqlx::query_as::<_, DamagedItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    rental_id: i64,
    item_id: i64,
    variation_id: i64,
    quantity: i64,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<i64> {
    let id = sqlx::query(
        "INSERT INTO damaged_item (rental_id, item_id, variation_id, quantity, notes, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 'awaiting_repair', ?6)",
    )
    .bind(rental_id)
    .bind(item_id)
    .bind(variation_id)
    .bind(quantity)
    .bind(notes)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Close an open damage record; false when it was already resolved
pub async fn resolve(
    conn: &mut SqliteConnection,
    id: i64,
    status: DamageStatus,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE damaged_item SET status = ?1, notes = COALESCE(?2, notes), resolved_at = ?3 WHERE id = ?4 AND status = 'awaiting_repair'",
    )
    .bind(status)
    .bind(notes)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count_awaiting(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM damaged_item WHERE status = 'awaiting_repair'")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
