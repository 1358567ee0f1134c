//! 预约 (Reservation)
//!
//! Storefront customers reserve garments for an event date. A reservation is
//! a priced request only: it never holds stock. Staff confirm it, cancel it,
//! or convert it into a rental, which is when the shelf stock moves.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::models::{
    Rental, RentalDetail, RentalItem, RentalItemInput, RentalLines,
    RentalPackage, RentalPackageInput, RentalStatus, Reservation, ReservationConvert,
    ReservationCreate, ReservationDetail, ReservationItem, ReservationPackage, ReservationReceipt,
    ReservationStatus,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::rental::StoredLines;
use crate::db::repository::{item, package, reservation, settings};
use crate::finance::money::validate_quantity;
use crate::finance::{DepositPolicy, Line, quote};
use crate::inventory::{Allocation, StockError};
use crate::rentals::WorkflowError;
use crate::rentals::workflow::{self, RENTAL_PREFIX};

pub const RESERVATION_PREFIX: &str = "RSV";

type Result<T> = std::result::Result<T, WorkflowError>;

/// Public reservation request
///
/// `today` is the shop's calendar date; an event date before it is rejected.
pub async fn create(
    pool: &SqlitePool,
    data: ReservationCreate,
    today: NaiveDate,
) -> Result<ReservationReceipt> {
    if data.items.is_empty() && data.packages.is_empty() {
        return Err(WorkflowError::Validation(
            "Reservation must contain at least one item or package".into(),
        ));
    }
    let event_date = workflow::parse_date("event_date", &data.event_date)?;
    if event_date < today {
        return Err(WorkflowError::DateInPast {
            field: "event_date",
            value: data.event_date,
        });
    }

    let mut tx = pool.begin().await?;
    let mut items = Vec::with_capacity(data.items.len());
    let mut shelf = BTreeMap::new();
    for line in &data.items {
        let (reserved, on_shelf) = reserve_item(&mut tx, line).await?;
        shelf.insert(reserved.variation_id, on_shelf);
        items.push(reserved);
    }
    let requested: Allocation = items.iter().map(|i| (i.variation_id, i.quantity)).collect();
    check_shelf(&requested, |id| shelf.get(&id).copied().unwrap_or(0))?;
    let mut packages = Vec::with_capacity(data.packages.len());
    for line in &data.packages {
        validate_quantity(line.quantity, "quantity")?;
        let pkg = package::find_in(&mut tx, line.package_id)
            .await?
            .ok_or(WorkflowError::PackageNotFound(line.package_id))?;
        if !pkg.is_active {
            return Err(WorkflowError::PackageInactive {
                package_id: pkg.id,
                name: pkg.name,
            });
        }
        packages.push(ReservationPackage {
            id: 0,
            reservation_id: 0,
            package_id: pkg.id,
            name: pkg.name,
            price: pkg.price,
            quantity: line.quantity,
        });
    }

    let estimate = quote_in(&mut tx, &items, &packages).await?;

    let now = shared::util::now_millis();
    let customer = data.customer;
    let header = Reservation {
        id: shared::util::snowflake_id(),
        reference_code: shared::util::reference_code(RESERVATION_PREFIX),
        customer_name: customer.name,
        customer_phone: customer.phone,
        customer_email: customer.email,
        customer_address: customer.address,
        event_date: data.event_date,
        status: ReservationStatus::Pending,
        notes: data.notes,
        rental_id: None,
        created_at: now,
        updated_at: now,
    };
    reservation::insert(&mut tx, &header, &items, &packages).await?;
    tx.commit().await?;

    tracing::info!(
        reservation_id = header.id,
        reference = %header.reference_code,
        event_date = %header.event_date,
        "Reservation submitted"
    );
    Ok(ReservationReceipt {
        reference_code: header.reference_code,
        status: header.status,
        quote: estimate,
    })
}

/// Variation must exist and belong to an active item; returns the line with its shelf quantity
async fn reserve_item(
    conn: &mut SqliteConnection,
    line: &RentalItemInput,
) -> Result<(ReservationItem, i64)> {
    validate_quantity(line.quantity, "quantity")?;
    let v = item::find_variation_with_item(conn, line.variation_id)
        .await?
        .ok_or(WorkflowError::VariationNotFound(line.variation_id))?;
    if !v.item_is_active {
        return Err(WorkflowError::ItemInactive {
            variation_id: v.variation_id,
            name: v.item_name,
        });
    }
    let on_shelf = v.quantity;
    Ok((
        ReservationItem {
            id: 0,
            reservation_id: 0,
            item_id: v.item_id,
            variation_id: v.variation_id,
            name: v.item_name,
            color: v.color,
            size: v.size,
            price: v.item_price,
            quantity: line.quantity,
        },
        on_shelf,
    ))
}

/// Every variation must be on the shelf in the combined quantity of all its lines
fn check_shelf(
    requested: &Allocation,
    on_shelf: impl Fn(i64) -> i64,
) -> std::result::Result<(), StockError> {
    for (variation_id, quantity) in requested.iter() {
        let available = on_shelf(variation_id);
        if available < quantity {
            return Err(StockError::Insufficient {
                variation_id,
                requested: quantity,
                available,
            });
        }
    }
    Ok(())
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<ReservationStatus>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Reservation>, i64)> {
    Ok(reservation::list(pool, status, search, limit, offset).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<ReservationDetail> {
    let mut conn = pool.acquire().await?;
    let found = load(&mut conn, id).await?;
    detail_in(&mut conn, found).await
}

/// pending → confirmed
pub async fn confirm(pool: &SqlitePool, id: i64) -> Result<ReservationDetail> {
    transition(pool, id, ReservationStatus::Confirmed).await
}

/// pending | confirmed → cancelled
pub async fn cancel(pool: &SqlitePool, id: i64) -> Result<ReservationDetail> {
    transition(pool, id, ReservationStatus::Cancelled).await
}

async fn transition(pool: &SqlitePool, id: i64, to: ReservationStatus) -> Result<ReservationDetail> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    let allowed = match to {
        ReservationStatus::Confirmed => current.status == ReservationStatus::Pending,
        ReservationStatus::Cancelled => current.status.is_open(),
        _ => false,
    };
    if !allowed
        || !reservation::set_status(&mut tx, id, current.status, to, None, shared::util::now_millis())
            .await?
    {
        return Err(WorkflowError::ReservationInvalidStatus(current.status));
    }

    let updated = load(&mut tx, id).await?;
    let detail = detail_in(&mut tx, updated).await?;
    tx.commit().await?;

    tracing::info!(reservation_id = id, from = %current.status, %to, "Reservation status changed");
    Ok(detail)
}

/// Turn an open reservation into a rental and take the stock, all in one transaction.
///
/// Reserved lines keep the prices quoted to the customer. Staff supply the
/// rental dates, the garments fulfilling each package and any tailoring lines.
pub async fn convert(pool: &SqlitePool, id: i64, data: ReservationConvert) -> Result<RentalDetail> {
    workflow::check_dates(&data.rental_date, &data.return_date)?;

    let mut tx = pool.begin().await?;
    let found = load(&mut tx, id).await?;
    if !found.status.is_open() {
        return Err(WorkflowError::ReservationInvalidStatus(found.status));
    }

    let reserved_items = reservation::items(&mut tx, id).await?;
    let reserved_packages = reservation::packages(&mut tx, id).await?;
    for a in &data.package_assignments {
        if !reserved_packages.iter().any(|p| p.package_id == a.package_id) {
            return Err(WorkflowError::Validation(format!(
                "Package {} is not part of this reservation",
                a.package_id
            )));
        }
    }

    let input = conversion_lines(&reserved_items, &reserved_packages, &data);
    if input.is_empty() {
        return Err(WorkflowError::Empty);
    }
    let reserved = reserved_snapshots(&reserved_items, &reserved_packages);
    let lines = workflow::resolve_lines(&mut tx, &input, &reserved).await?;

    let now = shared::util::now_millis();
    let header = Rental {
        id: shared::util::snowflake_id(),
        reference_code: shared::util::reference_code(RENTAL_PREFIX),
        customer_name: found.customer_name.clone(),
        customer_phone: found.customer_phone.clone(),
        customer_email: found.customer_email.clone(),
        customer_address: found.customer_address.clone(),
        rental_date: data.rental_date,
        return_date: data.return_date,
        status: RentalStatus::Pending,
        shop_discount: data.shop_discount.unwrap_or(0.0),
        deposit_override: data.deposit_override,
        stock_settled: false,
        reservation_id: Some(id),
        notes: data.notes.or(found.notes.clone()),
        created_at: now,
        updated_at: now,
    };
    workflow::open(&mut tx, &header, &lines).await?;

    if !reservation::set_status(
        &mut tx,
        id,
        found.status,
        ReservationStatus::Converted,
        Some(header.id),
        now,
    )
    .await?
    {
        return Err(WorkflowError::ReservationInvalidStatus(found.status));
    }

    let detail = workflow::detail_in(&mut tx, header).await?;
    tx.commit().await?;

    tracing::info!(
        reservation_id = id,
        reservation = %found.reference_code,
        rental_id = detail.rental.id,
        reference = %detail.rental.reference_code,
        "Reservation converted to rental"
    );
    Ok(detail)
}

/// Reserved lines plus staff input, in the shape the rental workflow resolves
fn conversion_lines(
    items: &[ReservationItem],
    packages: &[ReservationPackage],
    data: &ReservationConvert,
) -> RentalLines {
    RentalLines {
        items: items
            .iter()
            .map(|i| RentalItemInput {
                variation_id: i.variation_id,
                quantity: i.quantity,
            })
            .collect(),
        packages: packages
            .iter()
            .map(|p| RentalPackageInput {
                package_id: p.package_id,
                quantity: p.quantity,
                fulfillment: data
                    .package_assignments
                    .iter()
                    .filter(|a| a.package_id == p.package_id)
                    .flat_map(|a| a.fulfillment.iter().cloned())
                    .collect(),
            })
            .collect(),
        custom_items: data.custom_items.clone(),
    }
}

/// Reservation lines as rental snapshots, so conversion keeps the quoted prices
fn reserved_snapshots(items: &[ReservationItem], packages: &[ReservationPackage]) -> StoredLines {
    StoredLines {
        items: items
            .iter()
            .map(|i| RentalItem {
                id: 0,
                rental_id: 0,
                item_id: i.item_id,
                variation_id: i.variation_id,
                name: i.name.clone(),
                color: i.color.clone(),
                size: i.size.clone(),
                price: i.price,
                quantity: i.quantity,
            })
            .collect(),
        packages: packages
            .iter()
            .map(|p| RentalPackage {
                id: 0,
                rental_id: 0,
                package_id: p.package_id,
                name: p.name.clone(),
                price: p.price,
                quantity: p.quantity,
                fulfillment: Vec::new(),
            })
            .collect(),
        custom_items: Vec::new(),
    }
}

async fn load(conn: &mut SqliteConnection, id: i64) -> Result<Reservation> {
    reservation::find_by_id(conn, id)
        .await?
        .ok_or(WorkflowError::ReservationNotFound(id))
}

async fn quote_in(
    conn: &mut SqliteConnection,
    items: &[ReservationItem],
    packages: &[ReservationPackage],
) -> Result<shared::models::RentalFinancials> {
    let policy = DepositPolicy::from(&settings::get_in(conn).await?);
    let lines: Vec<Line> = items
        .iter()
        .map(Line::from)
        .chain(packages.iter().map(Line::from))
        .collect();
    Ok(quote(&lines, &policy)?)
}

pub(crate) async fn detail_in(
    conn: &mut SqliteConnection,
    found: Reservation,
) -> Result<ReservationDetail> {
    let items = reservation::items(conn, found.id).await?;
    let packages = reservation::packages(conn, found.id).await?;
    let estimate = quote_in(conn, &items, &packages).await?;
    Ok(ReservationDetail {
        reservation: found,
        items,
        packages,
        quote: estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{FulfillmentInput, PackageAssignment};

    fn convert_payload(assignments: Vec<PackageAssignment>) -> ReservationConvert {
        ReservationConvert {
            rental_date: "2026-06-01".into(),
            return_date: "2026-06-03".into(),
            package_assignments: assignments,
            custom_items: vec![],
            shop_discount: None,
            deposit_override: None,
            notes: None,
        }
    }

    fn reserved_package(package_id: i64) -> ReservationPackage {
        ReservationPackage {
            id: 1,
            reservation_id: 1,
            package_id,
            name: "Entourage".into(),
            price: 8000.0,
            quantity: 1,
        }
    }

    #[test]
    fn assignments_attach_to_their_package() {
        let data = convert_payload(vec![PackageAssignment {
            package_id: 5,
            fulfillment: vec![FulfillmentInput {
                role: "groom".into(),
                variation_id: 42,
                quantity: 1,
            }],
        }]);
        let lines = conversion_lines(&[], &[reserved_package(5), reserved_package(6)], &data);
        assert_eq!(lines.packages.len(), 2);
        assert_eq!(lines.packages[0].fulfillment.len(), 1);
        assert_eq!(lines.packages[0].fulfillment[0].variation_id, 42);
        assert!(lines.packages[1].fulfillment.is_empty());
    }

    #[test]
    fn snapshots_keep_quoted_prices() {
        let items = vec![ReservationItem {
            id: 1,
            reservation_id: 1,
            item_id: 3,
            variation_id: 30,
            name: "Filipiniana".into(),
            color: "Red".into(),
            size: "S".into(),
            price: 1800.0,
            quantity: 2,
        }];
        let stored = reserved_snapshots(&items, &[reserved_package(5)]);
        assert_eq!(stored.items[0].price, 1800.0);
        assert_eq!(stored.items[0].quantity, 2);
        assert_eq!(stored.packages[0].price, 8000.0);
    }

    #[test]
    fn repeated_variation_lines_are_checked_together() {
        let requested: Allocation = [(7, 1), (7, 1), (8, 1)].into_iter().collect();
        let shelf = |id: i64| if id == 7 { 1 } else { 5 };
        match check_shelf(&requested, shelf) {
            Err(StockError::Insufficient {
                variation_id,
                requested,
                available,
            }) => {
                assert_eq!(variation_id, 7);
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected a shortfall, got {other:?}"),
        }

        let enough: Allocation = [(7, 1), (8, 2), (8, 3)].into_iter().collect();
        assert!(check_shelf(&enough, shelf).is_ok());
    }
}
