//! 预约到店 (Appointment)
//!
//! Measurement, fitting, consultation and pickup visits booked into the
//! shop's configured time slots. Each slot takes at most
//! `appointment_slot_capacity` non-cancelled appointments; a completed visit
//! or a no-show keeps its place.

use chrono::NaiveDate;
use shared::models::{
    Appointment, AppointmentCreate, AppointmentReschedule, AppointmentStatus, ShopSettings,
    SlotAvailability,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{appointment, settings};
use crate::rentals::WorkflowError;
use crate::rentals::workflow::parse_date;

pub const APPOINTMENT_PREFIX: &str = "APT";

type Result<T> = std::result::Result<T, WorkflowError>;

/// Public booking
pub async fn create(
    pool: &SqlitePool,
    data: AppointmentCreate,
    today: NaiveDate,
) -> Result<Appointment> {
    check_not_past(&data.appointment_date, today)?;

    let mut tx = pool.begin().await?;
    claim_slot(&mut tx, &data.appointment_date, &data.time_slot, None).await?;

    let now = shared::util::now_millis();
    let booked = Appointment {
        id: shared::util::snowflake_id(),
        reference_code: shared::util::reference_code(APPOINTMENT_PREFIX),
        customer_name: data.customer.name,
        customer_phone: data.customer.phone,
        customer_email: data.customer.email,
        appointment_date: data.appointment_date,
        time_slot: data.time_slot,
        appointment_type: data.appointment_type,
        status: AppointmentStatus::Pending,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    };
    appointment::insert(&mut tx, &booked).await?;
    tx.commit().await?;

    tracing::info!(
        appointment_id = booked.id,
        reference = %booked.reference_code,
        date = %booked.appointment_date,
        slot = %booked.time_slot,
        "Appointment booked"
    );
    Ok(booked)
}

/// Remaining capacity of every configured slot on `date`
pub async fn availability(pool: &SqlitePool, date: &str) -> Result<Vec<SlotAvailability>> {
    parse_date("date", date)?;
    let shop = settings::get(pool).await?;
    let booked = appointment::booked_by_slot(pool, date).await?;
    Ok(slot_table(&shop, &booked))
}

fn slot_table(shop: &ShopSettings, booked: &[(String, i64)]) -> Vec<SlotAvailability> {
    shop.appointment_slots
        .iter()
        .map(|slot| {
            let taken = booked
                .iter()
                .find(|(s, _)| s == slot)
                .map_or(0, |(_, n)| *n);
            SlotAvailability {
                time_slot: slot.clone(),
                capacity: shop.appointment_slot_capacity,
                booked: taken,
                remaining: (shop.appointment_slot_capacity - taken).max(0),
            }
        })
        .collect()
}

pub async fn list(
    pool: &SqlitePool,
    date: Option<&str>,
    status: Option<AppointmentStatus>,
) -> Result<Vec<Appointment>> {
    if let Some(d) = date {
        parse_date("date", d)?;
    }
    Ok(appointment::list(pool, date, status).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Appointment> {
    let mut conn = pool.acquire().await?;
    load(&mut conn, id).await
}

/// Status change along `pending → confirmed | cancelled`,
/// `confirmed → completed | cancelled | no_show`
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    to: AppointmentStatus,
) -> Result<Appointment> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    let from = current.status;
    if !from.can_transition_to(to)
        || !appointment::set_status(&mut tx, id, from, to, shared::util::now_millis()).await?
    {
        return Err(WorkflowError::AppointmentInvalidStatus { from, to });
    }
    let updated = load(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(appointment_id = id, %from, %to, "Appointment status changed");
    Ok(updated)
}

/// Move an open appointment to another date/slot, under the same capacity rule
pub async fn reschedule(
    pool: &SqlitePool,
    id: i64,
    data: AppointmentReschedule,
    today: NaiveDate,
) -> Result<Appointment> {
    check_not_past(&data.appointment_date, today)?;

    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    if !current.status.is_open() {
        return Err(WorkflowError::Validation(format!(
            "A {} appointment cannot be rescheduled",
            current.status
        )));
    }
    claim_slot(&mut tx, &data.appointment_date, &data.time_slot, Some(id)).await?;

    appointment::reschedule(
        &mut tx,
        id,
        &data.appointment_date,
        &data.time_slot,
        shared::util::now_millis(),
    )
    .await?;
    let updated = load(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(
        appointment_id = id,
        from_date = %current.appointment_date,
        from_slot = %current.time_slot,
        date = %updated.appointment_date,
        slot = %updated.time_slot,
        "Appointment rescheduled"
    );
    Ok(updated)
}

// ── Helpers ─────────────────────────────────────────────────────────

fn check_not_past(date: &str, today: NaiveDate) -> Result<()> {
    if parse_date("appointment_date", date)? < today {
        return Err(WorkflowError::DateInPast {
            field: "appointment_date",
            value: date.to_string(),
        });
    }
    Ok(())
}

/// Slot must be offered and still below capacity (ignoring `exclude_id` itself)
async fn claim_slot(
    conn: &mut SqliteConnection,
    date: &str,
    slot: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let shop = settings::get_in(conn).await?;
    if !shop.appointment_slots.iter().any(|s| s == slot) {
        return Err(WorkflowError::SlotUnavailable(slot.to_string()));
    }
    let taken = appointment::count_in_slot(conn, date, slot, exclude_id).await?;
    if taken >= shop.appointment_slot_capacity {
        return Err(WorkflowError::SlotFull {
            date: date.to_string(),
            slot: slot.to_string(),
        });
    }
    Ok(())
}

async fn load(conn: &mut SqliteConnection, id: i64) -> Result<Appointment> {
    appointment::find_by_id(conn, id)
        .await?
        .ok_or(WorkflowError::AppointmentNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{AppointmentType, CustomerInfo};

    fn shop(slots: &[&str], capacity: i64) -> ShopSettings {
        ShopSettings {
            shop_name: "Atelier".into(),
            contact_phone: None,
            contact_email: None,
            address: None,
            single_item_deposit_cap: 2000.0,
            package_deposit: 5000.0,
            low_stock_threshold: 2,
            appointment_slots: slots.iter().map(|s| s.to_string()).collect(),
            appointment_slot_capacity: capacity,
            updated_at: 0,
        }
    }

    #[test]
    fn slot_table_follows_configured_order() {
        let table = slot_table(
            &shop(&["09:00", "13:00", "15:00"], 2),
            &[("13:00".into(), 2), ("09:00".into(), 1), ("17:00".into(), 4)],
        );
        let remaining: Vec<_> = table.iter().map(|s| (s.time_slot.as_str(), s.remaining)).collect();
        assert_eq!(remaining, vec![("09:00", 1), ("13:00", 0), ("15:00", 2)]);
    }

    #[test]
    fn over_booked_slot_reports_zero_remaining() {
        // capacity lowered after bookings were taken
        let table = slot_table(&shop(&["10:00"], 1), &[("10:00".into(), 3)]);
        assert_eq!(table[0].booked, 3);
        assert_eq!(table[0].remaining, 0);
    }

    #[test]
    fn past_dates_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        assert!(check_not_past("2026-05-10", today).is_ok());
        assert!(matches!(
            check_not_past("2026-05-09", today),
            Err(WorkflowError::DateInPast { .. })
        ));
        assert!(matches!(
            check_not_past("10/05/2026", today),
            Err(WorkflowError::InvalidDate { .. })
        ));
    }

    fn booking(name: &str) -> AppointmentCreate {
        AppointmentCreate {
            customer: CustomerInfo {
                name: name.into(),
                phone: "09175550101".into(),
                ..Default::default()
            },
            appointment_date: "2026-05-10".into(),
            time_slot: "10:00".into(),
            appointment_type: AppointmentType::Fitting,
            notes: None,
        }
    }

    #[tokio::test]
    async fn finished_visits_keep_their_place_in_the_slot() {
        let db = DbService::open_in_memory().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        // seeded capacity is 2 per slot
        let a = create(&db.pool, booking("Ana"), today).await.unwrap();
        let b = create(&db.pool, booking("Bea"), today).await.unwrap();
        for (id, end) in [(a.id, AppointmentStatus::Completed), (b.id, AppointmentStatus::NoShow)] {
            update_status(&db.pool, id, AppointmentStatus::Confirmed).await.unwrap();
            update_status(&db.pool, id, end).await.unwrap();
        }

        assert!(matches!(
            create(&db.pool, booking("Cora"), today).await,
            Err(WorkflowError::SlotFull { .. })
        ));
        let slots = availability(&db.pool, "2026-05-10").await.unwrap();
        let ten = slots.iter().find(|s| s.time_slot == "10:00").unwrap();
        assert_eq!((ten.booked, ten.remaining), (2, 0));
    }

    #[tokio::test]
    async fn cancellation_frees_the_slot() {
        let db = DbService::open_in_memory().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let a = create(&db.pool, booking("Ana"), today).await.unwrap();
        create(&db.pool, booking("Bea"), today).await.unwrap();
        update_status(&db.pool, a.id, AppointmentStatus::Cancelled).await.unwrap();

        assert!(create(&db.pool, booking("Cora"), today).await.is_ok());
    }

    #[tokio::test]
    async fn completed_visit_cannot_be_rescheduled() {
        let db = DbService::open_in_memory().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let a = create(&db.pool, booking("Ana"), today).await.unwrap();
        update_status(&db.pool, a.id, AppointmentStatus::Confirmed).await.unwrap();
        update_status(&db.pool, a.id, AppointmentStatus::Completed).await.unwrap();

        let moved = AppointmentReschedule {
            appointment_date: "2026-05-11".into(),
            time_slot: "11:00".into(),
        };
        assert!(matches!(
            reschedule(&db.pool, a.id, moved, today).await,
            Err(WorkflowError::Validation(_))
        ));
    }
}
