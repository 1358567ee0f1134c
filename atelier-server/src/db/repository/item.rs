//! Item & Variation Repository

use std::collections::HashMap;

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{
    Item, ItemCreate, ItemUpdate, ItemVariation, LowStockVariation, VariationCreate,
    VariationUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

const ITEM_SELECT: &str = "SELECT id, name, category, description, price, image, is_active, created_at, updated_at FROM item";
const VARIATION_SELECT: &str = "SELECT id, item_id, color, size, quantity FROM item_variation";

/// Variation joined with its item, used to snapshot rental lines
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariationWithItem {
    pub variation_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_price: f64,
    pub item_is_active: bool,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

/// Item list filters
#[derive(Debug, Clone, Default)]
pub struct ItemFilter<'a> {
    pub active_only: bool,
    pub category: Option<&'a str>,
    pub search: Option<&'a str>,
}

pub async fn find_all(pool: &SqlitePool, filter: ItemFilter<'_>) -> RepoResult<Vec<Item>> {
    let sql = format!(
        "{ITEM_SELECT} WHERE (?1 = 0 OR is_active = 1) AND (?2 IS NULL OR category = ?2 COLLATE NOCASE) AND (?3 IS NULL OR name LIKE ?3 ESCAPE '\\' OR description LIKE ?3 ESCAPE '\\') ORDER BY category, name"
    );
    let mut items = sqlx::query_as::<_, Item>(&sql)
        .bind(filter.active_only)
        .bind(filter.category)
        .bind(filter.search.map(like_pattern))
        .fetch_all(pool)
        .await?;
    attach_variations(pool, &mut items).await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Item>> {
    let sql = format!("{ITEM_SELECT} WHERE id = ?");
    let item = sqlx::query_as::<_, Item>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(item) = item else {
        return Ok(None);
    };
    let mut items = vec![item];
    attach_variations(pool, &mut items).await?;
    Ok(items.pop())
}

async fn attach_variations(pool: &SqlitePool, items: &mut [Item]) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; items.len()].join(", ");
    let sql = format!("{VARIATION_SELECT} WHERE item_id IN ({placeholders}) ORDER BY color, size");
    let mut query = sqlx::query_as::<_, ItemVariation>(&sql);
    for item in items.iter() {
        query = query.bind(item.id);
    }
    let variations = query.fetch_all(pool).await?;

    let mut by_item: HashMap<i64, Vec<ItemVariation>> = HashMap::new();
    for v in variations {
        by_item.entry(v.item_id).or_default().push(v);
    }
    for item in items.iter_mut() {
        item.variations = by_item.remove(&item.id).unwrap_or_default();
    }
    Ok(())
}

/// Distinct categories of active items
pub async fn categories(pool: &SqlitePool) -> RepoResult<Vec<String>> {
    let rows = sqlx::query_scalar(
        "SELECT DISTINCT category FROM item WHERE is_active = 1 ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: ItemCreate) -> RepoResult<Item> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO item (id, name, category, description, price, image, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    for v in &data.variations {
        insert_variation(&mut tx, id, v).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ItemUpdate) -> RepoResult<Item> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE item SET name = COALESCE(?1, name), category = COALESCE(?2, category), description = COALESCE(?3, description), price = COALESCE(?4, price), image = COALESCE(?5, image), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name)
    .bind(data.category)
    .bind(data.description)
    .bind(data.price)
    .bind(data.image)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Item {id} not found")))
}

/// Soft delete: rental history keeps pointing at the row
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE item SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Variations ──────────────────────────────────────────────────────

async fn insert_variation(
    conn: &mut SqliteConnection,
    item_id: i64,
    data: &VariationCreate,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO item_variation (id, item_id, color, size, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(item_id)
    .bind(data.color.trim())
    .bind(data.size.trim())
    .bind(data.quantity)
    .execute(&mut *conn)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!(
            "Variation {}/{} already exists",
            data.color, data.size
        )),
        other => other,
    })?;
    Ok(id)
}

pub async fn add_variation(
    pool: &SqlitePool,
    item_id: i64,
    data: VariationCreate,
) -> RepoResult<ItemVariation> {
    let mut conn = pool.acquire().await?;
    let id = insert_variation(&mut conn, item_id, &data).await?;
    find_variation(&mut conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create variation".into()))
}

pub async fn find_variation(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<ItemVariation>> {
    let sql = format!("{VARIATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ItemVariation>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn update_variation(
    pool: &SqlitePool,
    id: i64,
    data: VariationUpdate,
) -> RepoResult<ItemVariation> {
    let mut conn = pool.acquire().await?;
    let rows = sqlx::query(
        "UPDATE item_variation SET color = COALESCE(?1, color), size = COALESCE(?2, size) WHERE id = ?3",
    )
    .bind(data.color.as_deref().map(str::trim))
    .bind(data.size.as_deref().map(str::trim))
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Variation {id} not found")));
    }
    find_variation(&mut conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Variation {id} not found")))
}

/// Whether any rental, reservation or damage record points at the variation
pub async fn variation_in_use(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let used: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM rental_item WHERE variation_id = ?1)
             OR EXISTS (SELECT 1 FROM rental_package_fulfillment WHERE variation_id = ?1)
             OR EXISTS (SELECT 1 FROM reservation_item WHERE variation_id = ?1)
             OR EXISTS (SELECT 1 FROM damaged_item WHERE variation_id = ?1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(used)
}

pub async fn delete_variation(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM item_variation WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Variation with its item, read inside the caller's transaction
pub async fn find_variation_with_item(
    conn: &mut SqliteConnection,
    variation_id: i64,
) -> RepoResult<Option<VariationWithItem>> {
    let row = sqlx::query_as::<_, VariationWithItem>(
        "SELECT v.id AS variation_id, v.item_id, i.name AS item_name, i.price AS item_price, i.is_active AS item_is_active, v.color, v.size, v.quantity FROM item_variation v JOIN item i ON i.id = v.item_id WHERE v.id = ?",
    )
    .bind(variation_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

// ── Stock reporting ─────────────────────────────────────────────────

const LOW_STOCK_SELECT: &str = "SELECT v.id AS variation_id, v.item_id, i.name AS item_name, v.color, v.size, v.quantity FROM item_variation v JOIN item i ON i.id = v.item_id WHERE i.is_active = 1 AND v.quantity <= ?";

pub async fn low_stock(pool: &SqlitePool, threshold: i64) -> RepoResult<Vec<LowStockVariation>> {
    let sql = format!("{LOW_STOCK_SELECT} ORDER BY v.quantity, i.name");
    let rows = sqlx::query_as::<_, LowStockVariation>(&sql)
        .bind(threshold)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_low_stock(pool: &SqlitePool, threshold: i64) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM item_variation v JOIN item i ON i.id = v.item_id WHERE i.is_active = 1 AND v.quantity <= ?",
    )
    .bind(threshold)
    .fetch_one(pool)
    .await?;
    Ok(n)
}
