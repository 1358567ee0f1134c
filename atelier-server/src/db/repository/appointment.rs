//! Appointment Repository

use super::RepoResult;
use shared::models::{Appointment, AppointmentStatus};
use sqlx::{SqliteConnection, SqlitePool};

const APPOINTMENT_SELECT: &str = "SELECT id, reference_code, customer_name, customer_phone, customer_email, appointment_date, time_slot, appointment_type, status, notes, created_at, updated_at FROM appointment";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Appointment>> {
    let sql = format!("{APPOINTMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_reference(pool: &SqlitePool, code: &str) -> RepoResult<Option<Appointment>> {
    let sql = format!("{APPOINTMENT_SELECT} WHERE reference_code = ? COLLATE NOCASE");
    let row = sqlx::query_as::<_, Appointment>(&sql)
        .bind(code.trim())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list(
    pool: &SqlitePool,
    date: Option<&str>,
    status: Option<AppointmentStatus>,
) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{APPOINTMENT_SELECT} WHERE (?1 IS NULL OR appointment_date = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY appointment_date, time_slot, created_at"
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(date)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn insert(conn: &mut SqliteConnection, a: &Appointment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO appointment (id, reference_code, customer_name, customer_phone, customer_email, appointment_date, time_slot, appointment_type, status, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(a.id)
    .bind(&a.reference_code)
    .bind(&a.customer_name)
    .bind(&a.customer_phone)
    .bind(&a.customer_email)
    .bind(&a.appointment_date)
    .bind(&a.time_slot)
    .bind(a.appointment_type)
    .bind(a.status)
    .bind(&a.notes)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Non-cancelled appointments in a date+slot, optionally ignoring one
pub async fn count_in_slot(
    conn: &mut SqliteConnection,
    date: &str,
    slot: &str,
    exclude_id: Option<i64>,
) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM appointment WHERE appointment_date = ?1 AND time_slot = ?2 AND status != 'cancelled' AND (?3 IS NULL OR id != ?3)",
    )
    .bind(date)
    .bind(slot)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(n)
}

/// Non-cancelled appointment counts per slot on a date
pub async fn booked_by_slot(pool: &SqlitePool, date: &str) -> RepoResult<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT time_slot, COUNT(*) FROM appointment WHERE appointment_date = ? AND status != 'cancelled' GROUP BY time_slot",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: AppointmentStatus,
    to: AppointmentStatus,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE appointment SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn reschedule(
    conn: &mut SqliteConnection,
    id: i64,
    date: &str,
    slot: &str,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE appointment SET appointment_date = ?1, time_slot = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(date)
    .bind(slot)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Mark pending appointments dated before `today` as no-shows
pub async fn expire_past(pool: &SqlitePool, today: &str, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE appointment SET status = 'no_show', updated_at = ?1 WHERE status = 'pending' AND appointment_date < ?2",
    )
    .bind(now)
    .bind(today)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn count_pending(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM appointment WHERE status = 'pending'")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Open appointments on a date
pub async fn count_on_date(pool: &SqlitePool, date: &str) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM appointment WHERE appointment_date = ? AND status IN ('pending', 'confirmed')",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(n)
}
