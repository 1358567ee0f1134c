//! Rental Repository
//!
//! Row-level reads and writes for rentals and their lines. Every write takes
//! `&mut SqliteConnection` so the rental workflow can group them with stock
//! changes in one transaction.

use std::collections::HashMap;

use super::{RepoResult, like_pattern};
use shared::models::{
    PackageFulfillment, Rental, RentalCustomItem, RentalItem, RentalPackage, RentalPayment,
    RentalStatus,
};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const RENTAL_SELECT: &str = "SELECT id, reference_code, customer_name, customer_phone, customer_email, customer_address, rental_date, return_date, status, shop_discount, deposit_override, stock_settled, reservation_id, notes, created_at, updated_at FROM rental";

/// All lines of a stored rental
#[derive(Debug, Clone, Default)]
pub struct StoredLines {
    pub items: Vec<RentalItem>,
    pub packages: Vec<RentalPackage>,
    pub custom_items: Vec<RentalCustomItem>,
}

/// Rental list filters
#[derive(Debug, Clone, Default)]
pub struct RentalFilter {
    pub status: Option<RentalStatus>,
    /// Matches reference code, customer name or phone
    pub search: Option<String>,
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Rental>> {
    let sql = format!("{RENTAL_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Rental>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_reference(pool: &SqlitePool, code: &str) -> RepoResult<Option<Rental>> {
    let sql = format!("{RENTAL_SELECT} WHERE reference_code = ? COLLATE NOCASE");
    let row = sqlx::query_as::<_, Rental>(&sql)
        .bind(code.trim())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

const RENTAL_FILTER: &str = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR reference_code LIKE ?2 ESCAPE '\\' OR customer_name LIKE ?2 ESCAPE '\\' OR customer_phone LIKE ?2 ESCAPE '\\')";

/// One page of rentals (newest first) and the total match count
pub async fn list(
    pool: &SqlitePool,
    filter: &RentalFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Rental>, i64)> {
    let pattern = filter.search.as_deref().map(like_pattern);
    let sql = format!("{RENTAL_SELECT} {RENTAL_FILTER} ORDER BY created_at DESC LIMIT ?3 OFFSET ?4");
    let rows = sqlx::query_as::<_, Rental>(&sql)
        .bind(filter.status)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM rental {RENTAL_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(filter.status)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

pub async fn insert(conn: &mut SqliteConnection, r: &Rental) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO rental (id, reference_code, customer_name, customer_phone, customer_email, customer_address, rental_date, return_date, status, shop_discount, deposit_override, stock_settled, reservation_id, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(r.id)
    .bind(&r.reference_code)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(&r.customer_email)
    .bind(&r.customer_address)
    .bind(&r.rental_date)
    .bind(&r.return_date)
    .bind(r.status)
    .bind(r.shop_discount)
    .bind(r.deposit_override)
    .bind(r.stock_settled)
    .bind(r.reservation_id)
    .bind(&r.notes)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Write back the editable header fields of `r`
pub async fn update_details(conn: &mut SqliteConnection, r: &Rental) -> RepoResult<()> {
    sqlx::query(
        "UPDATE rental SET customer_name = ?1, customer_phone = ?2, customer_email = ?3, customer_address = ?4, rental_date = ?5, return_date = ?6, shop_discount = ?7, deposit_override = ?8, notes = ?9, updated_at = ?10 WHERE id = ?11",
    )
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(&r.customer_email)
    .bind(&r.customer_address)
    .bind(&r.rental_date)
    .bind(&r.return_date)
    .bind(r.shop_discount)
    .bind(r.deposit_override)
    .bind(&r.notes)
    .bind(r.updated_at)
    .bind(r.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Compare-and-set status change; returns false when the row is no longer in `from`
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: RentalStatus,
    to: RentalStatus,
    stock_settled: bool,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE rental SET status = ?1, stock_settled = ?2, updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(to)
    .bind(stock_settled)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query("UPDATE rental SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ── Lines ───────────────────────────────────────────────────────────

pub async fn load_lines(conn: &mut SqliteConnection, rental_id: i64) -> RepoResult<StoredLines> {
    let items = sqlx::query_as::<_, RentalItem>(
        "SELECT id, rental_id, item_id, variation_id, name, color, size, price, quantity FROM rental_item WHERE rental_id = ? ORDER BY id",
    )
    .bind(rental_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut packages = sqlx::query_as::<_, RentalPackage>(
        "SELECT id, rental_id, package_id, name, price, quantity FROM rental_package WHERE rental_id = ? ORDER BY id",
    )
    .bind(rental_id)
    .fetch_all(&mut *conn)
    .await?;

    let fulfillment = sqlx::query_as::<_, PackageFulfillment>(
        "SELECT f.id, f.rental_package_id, f.role, f.item_id, f.variation_id, f.quantity FROM rental_package_fulfillment f JOIN rental_package p ON p.id = f.rental_package_id WHERE p.rental_id = ? ORDER BY f.id",
    )
    .bind(rental_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut by_package: HashMap<i64, Vec<PackageFulfillment>> = HashMap::new();
    for f in fulfillment {
        by_package.entry(f.rental_package_id).or_default().push(f);
    }
    for p in packages.iter_mut() {
        p.fulfillment = by_package.remove(&p.id).unwrap_or_default();
    }

    let custom_items = sqlx::query_as::<_, RentalCustomItem>(
        "SELECT id, rental_id, name, tailoring_type, price, quantity, measurements, notes FROM rental_custom WHERE rental_id = ? ORDER BY id",
    )
    .bind(rental_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(StoredLines {
        items,
        packages,
        custom_items,
    })
}

/// Replace every line of a rental (fulfillment rows cascade with their package).
///
/// Line ids are assigned by SQLite; ids on `lines` are ignored.
pub async fn replace_lines(
    conn: &mut SqliteConnection,
    rental_id: i64,
    lines: &StoredLines,
) -> RepoResult<()> {
    for table in ["rental_item", "rental_package", "rental_custom"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE rental_id = ?"))
            .bind(rental_id)
            .execute(&mut *conn)
            .await?;
    }

    for l in &lines.items {
        sqlx::query(
            "INSERT INTO rental_item (rental_id, item_id, variation_id, name, color, size, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(rental_id)
        .bind(l.item_id)
        .bind(l.variation_id)
        .bind(&l.name)
        .bind(&l.color)
        .bind(&l.size)
        .bind(l.price)
        .bind(l.quantity)
        .execute(&mut *conn)
        .await?;
    }

    for p in &lines.packages {
        let package_row_id = sqlx::query(
            "INSERT INTO rental_package (rental_id, package_id, name, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(rental_id)
        .bind(p.package_id)
        .bind(&p.name)
        .bind(p.price)
        .bind(p.quantity)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        for f in &p.fulfillment {
            sqlx::query(
                "INSERT INTO rental_package_fulfillment (rental_package_id, role, item_id, variation_id, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(package_row_id)
            .bind(&f.role)
            .bind(f.item_id)
            .bind(f.variation_id)
            .bind(f.quantity)
            .execute(&mut *conn)
            .await?;
        }
    }

    for c in &lines.custom_items {
        sqlx::query(
            "INSERT INTO rental_custom (rental_id, name, tailoring_type, price, quantity, measurements, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(rental_id)
        .bind(&c.name)
        .bind(c.tailoring_type)
        .bind(c.price)
        .bind(c.quantity)
        .bind(Json(&c.measurements))
        .bind(&c.notes)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// ── Payments ────────────────────────────────────────────────────────

pub async fn payments(conn: &mut SqliteConnection, rental_id: i64) -> RepoResult<Vec<RentalPayment>> {
    let rows = sqlx::query_as::<_, RentalPayment>(
        "SELECT id, rental_id, amount, method, reference, note, paid_at FROM rental_payment WHERE rental_id = ? ORDER BY paid_at, id",
    )
    .bind(rental_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn insert_payment(conn: &mut SqliteConnection, p: &RentalPayment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO rental_payment (id, rental_id, amount, method, reference, note, paid_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(p.id)
    .bind(p.rental_id)
    .bind(p.amount)
    .bind(p.method)
    .bind(&p.reference)
    .bind(&p.note)
    .bind(p.paid_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete_payment(
    conn: &mut SqliteConnection,
    rental_id: i64,
    payment_id: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM rental_payment WHERE id = ? AND rental_id = ?")
        .bind(payment_id)
        .bind(rental_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Sweep ───────────────────────────────────────────────────────────

/// References of rentals still out after their return date
pub async fn overdue_references(pool: &SqlitePool, today: &str) -> RepoResult<Vec<String>> {
    let rows = sqlx::query_scalar(
        "SELECT reference_code FROM rental WHERE status = 'to_return' AND return_date < ? ORDER BY return_date",
    )
    .bind(today)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
