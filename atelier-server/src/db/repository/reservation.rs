//! Reservation Repository

use super::{RepoResult, like_pattern};
use shared::models::{Reservation, ReservationItem, ReservationPackage, ReservationStatus};
use sqlx::{SqliteConnection, SqlitePool};

const RESERVATION_SELECT: &str = "SELECT id, reference_code, customer_name, customer_phone, customer_email, customer_address, event_date, status, notes, rental_id, created_at, updated_at FROM reservation";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_reference(pool: &SqlitePool, code: &str) -> RepoResult<Option<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE reference_code = ? COLLATE NOCASE");
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(code.trim())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

const RESERVATION_FILTER: &str = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR reference_code LIKE ?2 ESCAPE '\\' OR customer_name LIKE ?2 ESCAPE '\\' OR customer_phone LIKE ?2 ESCAPE '\\')";

pub async fn list(
    pool: &SqlitePool,
    status: Option<ReservationStatus>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Reservation>, i64)> {
    let pattern = search.map(like_pattern);
    let sql = format!(
        "{RESERVATION_SELECT} {RESERVATION_FILTER} ORDER BY event_date, created_at LIMIT ?3 OFFSET ?4"
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(status)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM reservation {RESERVATION_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(status)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

/// Insert a reservation with its lines; line ids are assigned by SQLite
pub async fn insert(
    conn: &mut SqliteConnection,
    r: &Reservation,
    items: &[ReservationItem],
    packages: &[ReservationPackage],
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO reservation (id, reference_code, customer_name, customer_phone, customer_email, customer_address, event_date, status, notes, rental_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(r.id)
    .bind(&r.reference_code)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(&r.customer_email)
    .bind(&r.customer_address)
    .bind(&r.event_date)
    .bind(r.status)
    .bind(&r.notes)
    .bind(r.rental_id)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(&mut *conn)
    .await?;

    for i in items {
        sqlx::query(
            "INSERT INTO reservation_item (reservation_id, item_id, variation_id, name, color, size, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(r.id)
        .bind(i.item_id)
        .bind(i.variation_id)
        .bind(&i.name)
        .bind(&i.color)
        .bind(&i.size)
        .bind(i.price)
        .bind(i.quantity)
        .execute(&mut *conn)
        .await?;
    }
    for p in packages {
        sqlx::query(
            "INSERT INTO reservation_package (reservation_id, package_id, name, price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(r.id)
        .bind(p.package_id)
        .bind(&p.name)
        .bind(p.price)
        .bind(p.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn items(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> RepoResult<Vec<ReservationItem>> {
    let rows = sqlx::query_as::<_, ReservationItem>(
        "SELECT id, reservation_id, item_id, variation_id, name, color, size, price, quantity FROM reservation_item WHERE reservation_id = ? ORDER BY id",
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn packages(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> RepoResult<Vec<ReservationPackage>> {
    let rows = sqlx::query_as::<_, ReservationPackage>(
        "SELECT id, reservation_id, package_id, name, price, quantity FROM reservation_package WHERE reservation_id = ? ORDER BY id",
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Compare-and-set status change; false when the reservation is no longer in `from`
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
    rental_id: Option<i64>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE reservation SET status = ?1, rental_id = COALESCE(?2, rental_id), updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(to)
    .bind(rental_id)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Cancel open reservations whose event date is before `today`
pub async fn cancel_past(pool: &SqlitePool, today: &str, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE reservation SET status = 'cancelled', updated_at = ?1 WHERE status IN ('pending', 'confirmed') AND event_date < ?2",
    )
    .bind(now)
    .bind(today)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn count_by_status(pool: &SqlitePool, status: ReservationStatus) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM reservation WHERE status = ?")
        .bind(status)
        .fetch_one(pool)
        .await?;
    Ok(n)
}
