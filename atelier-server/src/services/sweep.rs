//! 定时清理 - 过期预约取消、未到店标记、逾期租赁提醒

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, appointment, rental, reservation};
use crate::utils::time::format_date;

/// Outcome of one sweep pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub reservations_cancelled: u64,
    pub appointments_no_show: u64,
    pub overdue_rentals: usize,
}

/// Run one pass against `today` (business timezone)
///
/// - pending/confirmed reservations whose event date has passed → cancelled
/// - pending appointments dated before today → no_show
/// - to_return rentals past their return date are only logged
pub async fn run_once(pool: &SqlitePool, today: NaiveDate) -> RepoResult<SweepReport> {
    let today = format_date(today);
    let now = shared::util::now_millis();

    let reservations_cancelled = reservation::cancel_past(pool, &today, now).await?;
    let appointments_no_show = appointment::expire_past(pool, &today, now).await?;
    let overdue = rental::overdue_references(pool, &today).await?;

    if reservations_cancelled > 0 || appointments_no_show > 0 {
        tracing::info!(
            reservations_cancelled,
            appointments_no_show,
            "Expired storefront requests swept"
        );
    }
    if !overdue.is_empty() {
        tracing::warn!(count = overdue.len(), references = ?overdue, "Rentals overdue for return");
    }

    Ok(SweepReport {
        reservations_cancelled,
        appointments_no_show,
        overdue_rentals: overdue.len(),
    })
}
