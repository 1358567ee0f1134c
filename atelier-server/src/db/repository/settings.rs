//! Shop Settings Repository (single row, id = 1)

use super::{RepoError, RepoResult};
use shared::models::{ShopSettings, ShopSettingsUpdate};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const SETTINGS_SELECT: &str = "SELECT shop_name, contact_phone, contact_email, address, single_item_deposit_cap, package_deposit, low_stock_threshold, appointment_slots, appointment_slot_capacity, updated_at FROM shop_settings WHERE id = 1";

pub async fn get(pool: &SqlitePool) -> RepoResult<ShopSettings> {
    let mut conn = pool.acquire().await?;
    get_in(&mut conn).await
}

/// Read inside the caller's transaction
pub async fn get_in(conn: &mut SqliteConnection) -> RepoResult<ShopSettings> {
    sqlx::query_as::<_, ShopSettings>(SETTINGS_SELECT)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound("Shop settings row is missing".into()))
}

pub async fn update(pool: &SqlitePool, data: ShopSettingsUpdate) -> RepoResult<ShopSettings> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE shop_settings SET shop_name = COALESCE(?1, shop_name), contact_phone = COALESCE(?2, contact_phone), contact_email = COALESCE(?3, contact_email), address = COALESCE(?4, address), single_item_deposit_cap = COALESCE(?5, single_item_deposit_cap), package_deposit = COALESCE(?6, package_deposit), low_stock_threshold = COALESCE(?7, low_stock_threshold), appointment_slots = COALESCE(?8, appointment_slots), appointment_slot_capacity = COALESCE(?9, appointment_slot_capacity), updated_at = ?10 WHERE id = 1",
    )
    .bind(data.shop_name)
    .bind(data.contact_phone)
    .bind(data.contact_email)
    .bind(data.address)
    .bind(data.single_item_deposit_cap)
    .bind(data.package_deposit)
    .bind(data.low_stock_threshold)
    .bind(data.appointment_slots.map(Json))
    .bind(data.appointment_slot_capacity)
    .bind(now)
    .execute(pool)
    .await?;
    get(pool).await
}
