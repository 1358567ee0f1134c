//! 店面请求查询
//!
//! 参考号前缀决定查询哪张表 (`RSV-` 预约、`APT-` 到店、`RNT-` 租赁)。
//! 联系方式必须与记录中的电话或邮箱一致，否则一律返回 TrackingNotFound，
//! 不泄露参考号是否存在。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CustomerInfo, TrackingResult};
use sqlx::SqlitePool;

use crate::appointments::APPOINTMENT_PREFIX;
use crate::db::repository::{appointment, reservation};
use crate::rentals::workflow::{self, RENTAL_PREFIX};
use crate::reservations::RESERVATION_PREFIX;

pub async fn track(pool: &SqlitePool, reference: &str, contact: &str) -> AppResult<TrackingResult> {
    let reference = reference.trim();
    if contact.trim().is_empty() {
        return Err(AppError::validation("contact is required"));
    }

    let found = match prefix_of(reference) {
        Some(RESERVATION_PREFIX) => reservation::find_by_reference(pool, reference)
            .await?
            .filter(|r| CustomerInfo::matches_contact(&r.customer_phone, r.customer_email.as_deref(), contact))
            .map(|r| TrackingResult::Reservation {
                reference_code: r.reference_code,
                customer_name: r.customer_name,
                event_date: r.event_date,
                status: r.status,
            }),
        Some(APPOINTMENT_PREFIX) => appointment::find_by_reference(pool, reference)
            .await?
            .filter(|a| CustomerInfo::matches_contact(&a.customer_phone, a.customer_email.as_deref(), contact))
            .map(|a| TrackingResult::Appointment {
                reference_code: a.reference_code,
                customer_name: a.customer_name,
                appointment_date: a.appointment_date,
                time_slot: a.time_slot,
                appointment_type: a.appointment_type,
                status: a.status,
            }),
        Some(RENTAL_PREFIX) => workflow::get_by_reference(pool, reference)
            .await?
            .filter(|d| {
                CustomerInfo::matches_contact(
                    &d.rental.customer_phone,
                    d.rental.customer_email.as_deref(),
                    contact,
                )
            })
            .map(|d| TrackingResult::Rental {
                reference_code: d.rental.reference_code,
                customer_name: d.rental.customer_name,
                rental_date: d.rental.rental_date,
                return_date: d.rental.return_date,
                status: d.rental.status,
                financials: d.financials,
            }),
        _ => None,
    };

    found.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::TrackingNotFound,
            "No request matches this reference and contact",
        )
    })
}

/// Upper-cased prefix before the first '-', if it is a known one
fn prefix_of(reference: &str) -> Option<&'static str> {
    let (prefix, _) = reference.split_once('-')?;
    [RESERVATION_PREFIX, APPOINTMENT_PREFIX, RENTAL_PREFIX]
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(prefix_of("rsv-ABCD2345"), Some(RESERVATION_PREFIX));
        assert_eq!(prefix_of("APT-XYZ"), Some(APPOINTMENT_PREFIX));
        assert_eq!(prefix_of("RNT-1"), Some(RENTAL_PREFIX));
        assert_eq!(prefix_of("ORD-1"), None);
        assert_eq!(prefix_of("RSV"), None);
    }
}
