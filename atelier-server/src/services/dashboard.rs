//! Back-office overview

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::{DashboardSummary, ReservationStatus};
use sqlx::SqlitePool;

use crate::db::repository::{
    RepoResult, appointment, damaged_item, dashboard, item, reservation, settings,
};
use crate::finance::money::round_money;
use crate::utils::time::{add_days, format_date, month_range_millis};

/// Returns due within this many days show up as upcoming
pub const UPCOMING_RETURN_DAYS: i64 = 7;

pub async fn summary(pool: &SqlitePool, today: NaiveDate, tz: Tz) -> RepoResult<DashboardSummary> {
    let today_str = format_date(today);
    let horizon = format_date(add_days(today, UPCOMING_RETURN_DAYS));
    let (month_start, month_end) = month_range_millis(today, tz);
    let shop = settings::get(pool).await?;

    Ok(DashboardSummary {
        pending_reservations: reservation::count_by_status(pool, ReservationStatus::Pending).await?,
        pending_appointments: appointment::count_pending(pool).await?,
        appointments_today: appointment::count_on_date(pool, &today_str).await?,
        active_rentals: dashboard::count_active_rentals(pool).await?,
        overdue_rentals: dashboard::count_overdue_rentals(pool, &today_str).await?,
        damaged_awaiting_repair: damaged_item::count_awaiting(pool).await?,
        low_stock_variations: item::count_low_stock(pool, shop.low_stock_threshold).await?,
        revenue_this_month: round_money(
            dashboard::revenue_between(pool, month_start, month_end).await?,
        ),
        upcoming_returns: dashboard::upcoming_returns(pool, &today_str, &horizon).await?,
        today: today_str,
    })
}
