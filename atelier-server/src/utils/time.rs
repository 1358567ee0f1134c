//! 时间工具函数: 业务时区转换
//!
//! 日历日期以 `YYYY-MM-DD` 字符串存储，"今天" 始终按业务时区计算；
//! 支付时间等时间戳统一为 `i64` Unix millis。

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时段字符串 (HH:MM, 24h)
pub fn parse_slot(slot: &str) -> AppResult<NaiveTime> {
    let slot = slot.trim();
    // chrono also accepts "9:00"; slots must compare as strings, so require two digits
    if slot.len() != 5 {
        return Err(AppError::validation(format!("Invalid time slot: {}", slot)));
    }
    NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time slot: {}", slot)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 日期 + 时分秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, min, sec).unwrap_or(NaiveTime::MIN));
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// 当月 `[月初, 次月初)` 的 Unix millis 范围 (业务时区)
pub fn month_range_millis(date: NaiveDate, tz: Tz) -> (i64, i64) {
    let first = date.with_day(1).unwrap_or(date);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first);
    (day_start_millis(first, tz), day_start_millis(next, tz))
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(
            parse_date(" 2026-02-28 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("28/02/2026").is_err());
    }

    #[test]
    fn slots_need_two_digit_hours() {
        assert!(parse_slot("09:30").is_ok());
        assert!(parse_slot("9:30").is_err());
        assert!(parse_slot("24:00").is_err());
        assert!(parse_slot("noon").is_err());
    }

    #[test]
    fn month_range_wraps_december() {
        let tz: Tz = "UTC".parse().unwrap();
        let (start, end) = month_range_millis(NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(), tz);
        assert_eq!(start, 1_764_547_200_000); // 2025-12-01T00:00:00Z
        assert_eq!(end, 1_767_225_600_000); // 2026-01-01T00:00:00Z
    }

    #[test]
    fn month_range_follows_business_timezone() {
        let manila: Tz = "Asia/Manila".parse().unwrap();
        let (start, _) = month_range_millis(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), manila);
        // 2026-03-01T00:00:00+08:00
        assert_eq!(start, 1_772_294_400_000);
    }
}
