//! Shelf stock mutations
//!
//! Every function runs on the caller's connection, normally `&mut *tx`, so a
//! failed guard aborts the whole business operation when the transaction is
//! dropped without commit.

use sqlx::SqliteConnection;

use super::{Allocation, StockDelta, StockError};

/// Apply a stock delta: increments first, then guarded decrements.
///
/// Increments go first so that swapping one unit for another of the same
/// variation never trips the guard.
pub async fn apply(conn: &mut SqliteConnection, delta: &StockDelta) -> Result<(), StockError> {
    for (variation_id, units) in delta.increments() {
        increment(conn, variation_id, units).await?;
    }
    for (variation_id, units) in delta.decrements() {
        decrement(conn, variation_id, units).await?;
    }
    if !delta.is_empty() {
        tracing::debug!(?delta, "Stock delta applied");
    }
    Ok(())
}

/// Take every unit of `allocation` off the shelf
pub async fn take(conn: &mut SqliteConnection, allocation: &Allocation) -> Result<(), StockError> {
    apply(conn, &StockDelta::take(allocation)).await
}

/// Put `allocation − damaged` back on the shelf, returning what was restored
pub async fn restore(
    conn: &mut SqliteConnection,
    allocation: &Allocation,
    damaged: &Allocation,
) -> Result<Allocation, StockError> {
    let shelf = allocation.without_damaged(damaged)?;
    apply(conn, &StockDelta::give_back(&shelf)).await?;
    Ok(shelf)
}

/// Manual correction of one variation; the result may not go below zero.
///
/// Returns the new shelf quantity.
pub async fn adjust(
    conn: &mut SqliteConnection,
    variation_id: i64,
    delta: i64,
) -> Result<i64, StockError> {
    if delta >= 0 {
        increment(conn, variation_id, delta).await?;
    } else {
        decrement(conn, variation_id, -delta).await?;
    }
    quantity_of(conn, variation_id)
        .await?
        .ok_or(StockError::VariationNotFound(variation_id))
}

async fn increment(
    conn: &mut SqliteConnection,
    variation_id: i64,
    units: i64,
) -> Result<(), StockError> {
    let rows = sqlx::query("UPDATE item_variation SET quantity = quantity + ?1 WHERE id = ?2")
        .bind(units)
        .bind(variation_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(StockError::VariationNotFound(variation_id));
    }
    Ok(())
}

async fn decrement(
    conn: &mut SqliteConnection,
    variation_id: i64,
    units: i64,
) -> Result<(), StockError> {
    let rows = sqlx::query(
        "UPDATE item_variation SET quantity = quantity - ?1 WHERE id = ?2 AND quantity >= ?1",
    )
    .bind(units)
    .bind(variation_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        // Guard miss: tell a missing variation apart from an empty shelf
        return match quantity_of(conn, variation_id).await? {
            Some(available) => {
                tracing::warn!(variation_id, requested = units, available, "Insufficient stock");
                Err(StockError::Insufficient {
                    variation_id,
                    requested: units,
                    available,
                })
            }
            None => Err(StockError::VariationNotFound(variation_id)),
        };
    }
    Ok(())
}

async fn quantity_of(
    conn: &mut SqliteConnection,
    variation_id: i64,
) -> Result<Option<i64>, StockError> {
    let qty = sqlx::query_scalar::<_, i64>("SELECT quantity FROM item_variation WHERE id = ?")
        .bind(variation_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(qty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::inventory::diff;

    async fn seed(db: &DbService, stock: &[(i64, i64)]) {
        sqlx::query(
            "INSERT INTO item (id, name, category, price, is_active, created_at, updated_at) VALUES (1, 'Gown', 'formal', 2500, 1, 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        for (id, qty) in stock {
            sqlx::query(
                "INSERT INTO item_variation (id, item_id, color, size, quantity) VALUES (?1, 1, 'red', ?2, ?3)",
            )
            .bind(id)
            .bind(format!("S{id}"))
            .bind(qty)
            .execute(&db.pool)
            .await
            .unwrap();
        }
    }

    async fn qty(db: &DbService, id: i64) -> i64 {
        sqlx::query_scalar("SELECT quantity FROM item_variation WHERE id = ?")
            .bind(id)
            .fetch_one(&db.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn take_and_restore_round_trip_with_damage() {
        let db = DbService::open_in_memory().await.unwrap();
        seed(&db, &[(1, 5), (2, 2)]).await;
        let rented: Allocation = [(1, 3), (2, 2)].into_iter().collect();

        let mut conn = db.pool.acquire().await.unwrap();
        take(&mut conn, &rented).await.unwrap();
        drop(conn);
        assert_eq!(qty(&db, 1).await, 2);
        assert_eq!(qty(&db, 2).await, 0);

        let damaged: Allocation = [(1, 1)].into_iter().collect();
        let mut conn = db.pool.acquire().await.unwrap();
        let restored = restore(&mut conn, &rented, &damaged).await.unwrap();
        drop(conn);
        assert_eq!(restored.get(1), 2);
        assert_eq!(qty(&db, 1).await, 4);
        assert_eq!(qty(&db, 2).await, 2);
    }

    #[tokio::test]
    async fn guard_miss_rolls_back_the_whole_transaction() {
        let db = DbService::open_in_memory().await.unwrap();
        seed(&db, &[(1, 1), (2, 5)]).await;

        // Returns variation 2, then asks for 3 units of variation 1
        let old: Allocation = [(2, 1)].into_iter().collect();
        let new: Allocation = [(1, 3)].into_iter().collect();

        let mut tx = db.pool.begin().await.unwrap();
        let err = apply(&mut tx, &diff(&old, &new)).await.unwrap_err();
        assert!(matches!(
            err,
            StockError::Insufficient { variation_id: 1, requested: 3, available: 1 }
        ));
        drop(tx);

        assert_eq!(qty(&db, 1).await, 1);
        assert_eq!(qty(&db, 2).await, 5);
    }

    #[tokio::test]
    async fn unknown_variation_is_reported() {
        let db = DbService::open_in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        let err = adjust(&mut conn, 999, 1).await.unwrap_err();
        assert!(matches!(err, StockError::VariationNotFound(999)));
    }

    #[tokio::test]
    async fn adjust_never_goes_negative() {
        let db = DbService::open_in_memory().await.unwrap();
        seed(&db, &[(1, 2)]).await;
        let mut conn = db.pool.acquire().await.unwrap();
        assert_eq!(adjust(&mut conn, 1, 3).await.unwrap(), 5);
        assert_eq!(adjust(&mut conn, 1, -5).await.unwrap(), 0);
        assert!(matches!(
            adjust(&mut conn, 1, -1).await,
            Err(StockError::Insufficient { .. })
        ));
    }
}
