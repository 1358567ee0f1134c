//! Dashboard aggregate queries

use super::RepoResult;
use shared::models::UpcomingReturn;
use sqlx::SqlitePool;

/// Rentals currently out of the shop or waiting to be picked up
pub async fn count_active_rentals(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rental WHERE status IN ('to_pickup', 'to_return')",
    )
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn count_overdue_rentals(pool: &SqlitePool, today: &str) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rental WHERE status = 'to_return' AND return_date < ?",
    )
    .bind(today)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

/// Σ payments with `paid_at` in `[start_ms, end_ms)`
pub async fn revenue_between(pool: &SqlitePool, start_ms: i64, end_ms: i64) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM rental_payment WHERE paid_at >= ? AND paid_at < ?",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Rentals still out with a return date in `[from, to]`
pub async fn upcoming_returns(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> RepoResult<Vec<UpcomingReturn>> {
    let rows = sqlx::query_as::<_, UpcomingReturn>(
        "SELECT id AS rental_id, reference_code, customer_name, customer_phone, return_date FROM rental WHERE status IN ('to_pickup', 'to_return') AND return_date >= ? AND return_date <= ? ORDER BY return_date, reference_code",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
