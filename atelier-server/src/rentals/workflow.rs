//! Rental workflow
//!
//! Each public function is one SQLite transaction: document writes and the
//! matching shelf stock changes commit together or not at all. Dropping the
//! transaction on an early `?` rolls everything back.

use std::collections::HashMap;

use chrono::NaiveDate;
use shared::models::{
    CustomerInfo, FulfillmentInput, PackageFulfillment, PaymentCreate, Rental, RentalCreate,
    RentalCustomInput, RentalCustomItem, RentalDetail, RentalFinancials, RentalItem,
    RentalItemInput, RentalLines, RentalPackage, RentalPackageInput, RentalPayment, RentalStatus,
    RentalStatusChange, RentalUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::WorkflowError;
use super::status::{self, StockEffect};
use crate::db::repository::rental::{RentalFilter, StoredLines};
use crate::db::repository::{damaged_item, item, package, rental, settings};
use crate::finance::calculator::{ensure_not_overpaid, rental_lines};
use crate::finance::money::validate_quantity;
use crate::finance::{DepositPolicy, calculate, validate_payment};
use crate::inventory::{Allocation, diff, ledger};

pub const RENTAL_PREFIX: &str = "RNT";

type Result<T> = std::result::Result<T, WorkflowError>;

// ── Commands ────────────────────────────────────────────────────────

/// Create a rental and take its garments off the shelf
pub async fn create(pool: &SqlitePool, data: RentalCreate) -> Result<RentalDetail> {
    if data.lines.is_empty() {
        return Err(WorkflowError::Empty);
    }
    check_dates(&data.rental_date, &data.return_date)?;

    let now = shared::util::now_millis();
    let header = Rental {
        id: shared::util::snowflake_id(),
        reference_code: shared::util::reference_code(RENTAL_PREFIX),
        customer_name: data.customer.name,
        customer_phone: data.customer.phone,
        customer_email: data.customer.email,
        customer_address: data.customer.address,
        rental_date: data.rental_date,
        return_date: data.return_date,
        status: RentalStatus::Pending,
        shop_discount: data.shop_discount.unwrap_or(0.0),
        deposit_override: data.deposit_override,
        stock_settled: false,
        reservation_id: None,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    };

    let mut tx = pool.begin().await?;
    let lines = resolve_lines(&mut tx, &data.lines, &StoredLines::default()).await?;
    open(&mut tx, &header, &lines).await?;
    let detail = detail_in(&mut tx, header).await?;
    tx.commit().await?;

    tracing::info!(
        rental_id = detail.rental.id,
        reference = %detail.rental.reference_code,
        grand_total = detail.financials.grand_total,
        "Rental created"
    );
    Ok(detail)
}

/// Insert a new rental and take its stock, inside the caller's transaction.
///
/// Shared by [`create`] and reservation conversion.
pub(crate) async fn open(
    conn: &mut SqliteConnection,
    header: &Rental,
    lines: &StoredLines,
) -> Result<RentalFinancials> {
    let policy = DepositPolicy::from(&settings::get_in(conn).await?);
    let financials = calculate(
        &rental_lines(&lines.items, &lines.packages, &lines.custom_items),
        &policy,
        header.shop_discount,
        header.deposit_override,
        &[],
    )?;

    let allocation = Allocation::from_rental(&lines.items, &lines.packages);
    ledger::take(conn, &allocation).await?;
    rental::insert(conn, header).await?;
    rental::replace_lines(conn, header.id, lines).await?;
    Ok(financials)
}

/// Replace every line of a rental, moving the stock difference
pub async fn replace_lines(pool: &SqlitePool, id: i64, input: RentalLines) -> Result<RentalDetail> {
    if input.is_empty() {
        return Err(WorkflowError::Empty);
    }

    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    if !status::lines_editable(current.status) {
        return Err(WorkflowError::Locked(current.status));
    }

    let old = rental::load_lines(&mut tx, id).await?;
    let new = resolve_lines(&mut tx, &input, &old).await?;

    // money first: a rejected discount or overpayment must not move stock
    let policy = DepositPolicy::from(&settings::get_in(&mut tx).await?);
    let payments = payment_amounts(&mut tx, id).await?;
    let financials = calculate(
        &rental_lines(&new.items, &new.packages, &new.custom_items),
        &policy,
        current.shop_discount,
        current.deposit_override,
        &payments,
    )?;
    ensure_not_overpaid(&financials)?;

    let delta = diff(
        &Allocation::from_rental(&old.items, &old.packages),
        &Allocation::from_rental(&new.items, &new.packages),
    );
    ledger::apply(&mut tx, &delta).await?;
    rental::replace_lines(&mut tx, id, &new).await?;
    rental::touch(&mut tx, id, shared::util::now_millis()).await?;

    let detail = detail_in(&mut tx, current).await?;
    tx.commit().await?;

    tracing::info!(rental_id = id, reference = %detail.rental.reference_code, ?delta, "Rental lines replaced");
    Ok(detail)
}

/// Update customer, dates, notes, discount and deposit override
pub async fn update_details(pool: &SqlitePool, id: i64, data: RentalUpdate) -> Result<RentalDetail> {
    let mut tx = pool.begin().await?;
    let mut current = load(&mut tx, id).await?;
    if status::is_terminal(current.status) {
        return Err(WorkflowError::Locked(current.status));
    }

    if let Some(CustomerInfo {
        name,
        phone,
        email,
        address,
    }) = data.customer
    {
        current.customer_name = name;
        current.customer_phone = phone;
        current.customer_email = email;
        current.customer_address = address;
    }
    if let Some(d) = data.rental_date {
        current.rental_date = d;
    }
    if let Some(d) = data.return_date {
        current.return_date = d;
    }
    check_dates(&current.rental_date, &current.return_date)?;
    if data.notes.is_some() {
        current.notes = data.notes;
    }
    if let Some(discount) = data.shop_discount {
        current.shop_discount = discount;
    }
    if data.clear_deposit_override {
        current.deposit_override = None;
    } else if data.deposit_override.is_some() {
        current.deposit_override = data.deposit_override;
    }

    // re-validate money against the stored lines and payments
    let lines = rental::load_lines(&mut tx, id).await?;
    let policy = DepositPolicy::from(&settings::get_in(&mut tx).await?);
    let payments = payment_amounts(&mut tx, id).await?;
    let financials = calculate(
        &rental_lines(&lines.items, &lines.packages, &lines.custom_items),
        &policy,
        current.shop_discount,
        current.deposit_override,
        &payments,
    )?;
    ensure_not_overpaid(&financials)?;

    current.updated_at = shared::util::now_millis();
    rental::update_details(&mut tx, &current).await?;
    let detail = detail_in(&mut tx, current).await?;
    tx.commit().await?;

    tracing::info!(rental_id = id, "Rental details updated");
    Ok(detail)
}

/// Record a payment; it may not exceed the remaining balance
pub async fn add_payment(pool: &SqlitePool, id: i64, data: PaymentCreate) -> Result<RentalDetail> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    if current.status == RentalStatus::Cancelled {
        return Err(WorkflowError::Locked(current.status));
    }

    let before = financials_in(&mut tx, &current).await?;
    validate_payment(data.amount, before.remaining_balance)?;

    let now = shared::util::now_millis();
    let payment = RentalPayment {
        id: shared::util::snowflake_id(),
        rental_id: id,
        amount: crate::finance::money::round_money(data.amount),
        method: data.method,
        reference: data.reference,
        note: data.note,
        paid_at: now,
    };
    rental::insert_payment(&mut tx, &payment).await?;
    rental::touch(&mut tx, id, now).await?;

    let detail = detail_in(&mut tx, current).await?;
    tx.commit().await?;

    tracing::info!(
        rental_id = id,
        payment_id = payment.id,
        amount = payment.amount,
        remaining = detail.financials.remaining_balance,
        "Payment recorded"
    );
    Ok(detail)
}

/// Delete a payment recorded by mistake
pub async fn remove_payment(pool: &SqlitePool, id: i64, payment_id: i64) -> Result<RentalDetail> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    if !rental::delete_payment(&mut tx, id, payment_id).await? {
        return Err(WorkflowError::PaymentNotFound(payment_id));
    }
    rental::touch(&mut tx, id, shared::util::now_millis()).await?;
    let detail = detail_in(&mut tx, current).await?;
    tx.commit().await?;

    tracing::info!(rental_id = id, payment_id, "Payment removed");
    Ok(detail)
}

/// Move a rental through its lifecycle, settling stock on return or cancel
pub async fn change_status(
    pool: &SqlitePool,
    id: i64,
    change: RentalStatusChange,
) -> Result<RentalDetail> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    let (from, to) = (current.status, change.status);
    if !status::can_transition(from, to) {
        return Err(WorkflowError::InvalidTransition { from, to });
    }

    let effect = status::stock_effect(to, current.stock_settled);
    if !change.damaged.is_empty() && effect != StockEffect::Restore {
        return Err(WorkflowError::Validation(
            "Damage can only be reported when garments come back".into(),
        ));
    }

    let now = shared::util::now_millis();
    match effect {
        StockEffect::None => {}
        StockEffect::Restore => {
            let lines = rental::load_lines(&mut tx, id).await?;
            let allocation = Allocation::from_rental(&lines.items, &lines.packages);
            let mut damaged = Allocation::new();
            for report in &change.damaged {
                validate_quantity(report.quantity, "damaged.quantity")?;
                damaged.add(report.variation_id, report.quantity);
            }
            let restored = ledger::restore(&mut tx, &allocation, &damaged).await?;

            let item_of = variation_items(&lines);
            for report in &change.damaged {
                let item_id = item_of
                    .get(&report.variation_id)
                    .copied()
                    .ok_or(WorkflowError::VariationNotFound(report.variation_id))?;
                damaged_item::insert(
                    &mut tx,
                    id,
                    item_id,
                    report.variation_id,
                    report.quantity,
                    report.notes.as_deref(),
                    now,
                )
                .await?;
            }
            tracing::info!(
                rental_id = id,
                restored_units = restored.total_units(),
                damaged_units = damaged.total_units(),
                "Rental stock restored"
            );
        }
        StockEffect::Reverse => {
            let lines = rental::load_lines(&mut tx, id).await?;
            let allocation = Allocation::from_rental(&lines.items, &lines.packages);
            ledger::restore(&mut tx, &allocation, &Allocation::new()).await?;
            tracing::info!(
                rental_id = id,
                restored_units = allocation.total_units(),
                "Rental cancelled, stock reversed"
            );
        }
    }

    let settled = current.stock_settled || effect != StockEffect::None;
    if !rental::set_status(&mut tx, id, from, to, settled, now).await? {
        // another request moved the rental first
        return Err(WorkflowError::InvalidTransition { from, to });
    }

    let updated = load(&mut tx, id).await?;
    let detail = detail_in(&mut tx, updated).await?;
    tx.commit().await?;

    tracing::info!(rental_id = id, reference = %detail.rental.reference_code, %from, %to, "Rental status changed");
    Ok(detail)
}

// ── Queries ─────────────────────────────────────────────────────────

pub async fn get(pool: &SqlitePool, id: i64) -> Result<RentalDetail> {
    let mut conn = pool.acquire().await?;
    let current = load(&mut conn, id).await?;
    detail_in(&mut conn, current).await
}

pub async fn get_by_reference(pool: &SqlitePool, reference: &str) -> Result<Option<RentalDetail>> {
    let Some(found) = rental::find_by_reference(pool, reference).await? else {
        return Ok(None);
    };
    let mut conn = pool.acquire().await?;
    Ok(Some(detail_in(&mut conn, found).await?))
}

pub async fn list(
    pool: &SqlitePool,
    filter: &RentalFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Rental>, i64)> {
    Ok(rental::list(pool, filter, limit, offset).await?)
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn load(conn: &mut SqliteConnection, id: i64) -> Result<Rental> {
    rental::find_by_id(conn, id)
        .await?
        .ok_or(WorkflowError::RentalNotFound(id))
}

async fn payment_amounts(conn: &mut SqliteConnection, id: i64) -> Result<Vec<f64>> {
    Ok(rental::payments(conn, id)
        .await?
        .iter()
        .map(|p| p.amount)
        .collect())
}

async fn financials_in(conn: &mut SqliteConnection, r: &Rental) -> Result<RentalFinancials> {
    let lines = rental::load_lines(conn, r.id).await?;
    let policy = DepositPolicy::from(&settings::get_in(conn).await?);
    let payments = payment_amounts(conn, r.id).await?;
    Ok(calculate(
        &rental_lines(&lines.items, &lines.packages, &lines.custom_items),
        &policy,
        r.shop_discount,
        r.deposit_override,
        &payments,
    )?)
}

/// Assemble the full detail view of a rental
pub(crate) async fn detail_in(conn: &mut SqliteConnection, r: Rental) -> Result<RentalDetail> {
    let StoredLines {
        items,
        packages,
        custom_items,
    } = rental::load_lines(conn, r.id).await?;
    let payments = rental::payments(conn, r.id).await?;
    let damaged_items = damaged_item::find_by_rental(conn, r.id).await?;
    let policy = DepositPolicy::from(&settings::get_in(conn).await?);
    let amounts: Vec<f64> = payments.iter().map(|p| p.amount).collect();
    let financials = calculate(
        &rental_lines(&items, &packages, &custom_items),
        &policy,
        r.shop_discount,
        r.deposit_override,
        &amounts,
    )?;
    Ok(RentalDetail {
        rental: r,
        items,
        packages,
        custom_items,
        payments,
        damaged_items,
        financials,
    })
}

/// `variation_id → item_id` over single items and package fulfillment
fn variation_items(lines: &StoredLines) -> HashMap<i64, i64> {
    lines
        .items
        .iter()
        .map(|l| (l.variation_id, l.item_id))
        .chain(
            lines
                .packages
                .iter()
                .flat_map(|p| p.fulfillment.iter().map(|f| (f.variation_id, f.item_id))),
        )
        .collect()
}

pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    crate::utils::time::parse_date(value).map_err(|_| WorkflowError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Both dates must parse and `return_date ≥ rental_date`
pub(crate) fn check_dates(rental_date: &str, return_date: &str) -> Result<()> {
    let start = parse_date("rental_date", rental_date)?;
    let end = parse_date("return_date", return_date)?;
    if end < start {
        return Err(WorkflowError::InvalidDates {
            rental_date: rental_date.to_string(),
            return_date: return_date.to_string(),
        });
    }
    Ok(())
}

// ── Line resolution ─────────────────────────────────────────────────

/// Turn line inputs into stored lines with price snapshots.
///
/// Lines already on the rental (`previous`) keep their snapshot, so editing a
/// rental never reprices garments the customer already agreed on, and an item
/// retired from the catalog can stay on a rental that already holds it.
pub(crate) async fn resolve_lines(
    conn: &mut SqliteConnection,
    input: &RentalLines,
    previous: &StoredLines,
) -> Result<StoredLines> {
    let held = Allocation::from_rental(&previous.items, &previous.packages);
    let mut lines = StoredLines::default();

    for i in &input.items {
        lines.items.push(resolve_item(conn, i, previous, &held).await?);
    }
    for p in &input.packages {
        lines.packages.push(resolve_package(conn, p, previous, &held).await?);
    }
    for c in &input.custom_items {
        lines.custom_items.push(resolve_custom(c)?);
    }
    Ok(lines)
}

async fn resolve_item(
    conn: &mut SqliteConnection,
    input: &RentalItemInput,
    previous: &StoredLines,
    held: &Allocation,
) -> Result<RentalItem> {
    validate_quantity(input.quantity, "quantity")?;
    let v = item::find_variation_with_item(conn, input.variation_id)
        .await?
        .ok_or(WorkflowError::VariationNotFound(input.variation_id))?;

    let (name, price) = match previous
        .items
        .iter()
        .find(|l| l.variation_id == input.variation_id)
    {
        Some(kept) => (kept.name.clone(), kept.price),
        None => {
            if !v.item_is_active && held.get(v.variation_id) == 0 {
                return Err(WorkflowError::ItemInactive {
                    variation_id: v.variation_id,
                    name: v.item_name,
                });
            }
            (v.item_name, v.item_price)
        }
    };

    Ok(RentalItem {
        id: 0,
        rental_id: 0,
        item_id: v.item_id,
        variation_id: v.variation_id,
        name,
        color: v.color,
        size: v.size,
        price,
        quantity: input.quantity,
    })
}

async fn resolve_package(
    conn: &mut SqliteConnection,
    input: &RentalPackageInput,
    previous: &StoredLines,
    held: &Allocation,
) -> Result<RentalPackage> {
    validate_quantity(input.quantity, "quantity")?;
    let pkg = package::find_in(conn, input.package_id)
        .await?
        .ok_or(WorkflowError::PackageNotFound(input.package_id))?;

    let (name, price) = match previous
        .packages
        .iter()
        .find(|l| l.package_id == input.package_id)
    {
        Some(kept) => (kept.name.clone(), kept.price),
        None => {
            if !pkg.is_active {
                return Err(WorkflowError::PackageInactive {
                    package_id: pkg.id,
                    name: pkg.name,
                });
            }
            (pkg.name, pkg.price)
        }
    };

    let mut fulfillment = Vec::with_capacity(input.fulfillment.len());
    for f in &input.fulfillment {
        fulfillment.push(resolve_fulfillment(conn, f, held).await?);
    }

    Ok(RentalPackage {
        id: 0,
        rental_id: 0,
        package_id: input.package_id,
        name,
        price,
        quantity: input.quantity,
        fulfillment,
    })
}

async fn resolve_fulfillment(
    conn: &mut SqliteConnection,
    input: &FulfillmentInput,
    held: &Allocation,
) -> Result<PackageFulfillment> {
    let role = input.role.trim();
    if role.is_empty() {
        return Err(WorkflowError::Validation(
            "Package fulfillment role must not be empty".into(),
        ));
    }
    validate_quantity(input.quantity, "fulfillment.quantity")?;
    let v = item::find_variation_with_item(conn, input.variation_id)
        .await?
        .ok_or(WorkflowError::VariationNotFound(input.variation_id))?;
    if !v.item_is_active && held.get(v.variation_id) == 0 {
        return Err(WorkflowError::ItemInactive {
            variation_id: v.variation_id,
            name: v.item_name,
        });
    }
    Ok(PackageFulfillment {
        id: 0,
        rental_package_id: 0,
        role: role.to_string(),
        item_id: v.item_id,
        variation_id: v.variation_id,
        quantity: input.quantity,
    })
}

fn resolve_custom(input: &RentalCustomInput) -> Result<RentalCustomItem> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(WorkflowError::Validation(
            "Custom item name must not be empty".into(),
        ));
    }
    let measurements = match &input.measurements {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(v) if v.is_object() => v.clone(),
        Some(_) => {
            return Err(WorkflowError::Validation(
                "Measurements must be a JSON object".into(),
            ));
        }
    };
    Ok(RentalCustomItem {
        id: 0,
        rental_id: 0,
        name: name.to_string(),
        tailoring_type: input.tailoring_type,
        price: input.price,
        quantity: input.quantity,
        measurements,
        notes: input.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::TailoringType;

    #[test]
    fn dates_must_be_ordered() {
        assert!(check_dates("2026-05-01", "2026-05-01").is_ok());
        assert!(matches!(
            check_dates("2026-05-03", "2026-05-01"),
            Err(WorkflowError::InvalidDates { .. })
        ));
        assert!(matches!(
            check_dates("May 1", "2026-05-01"),
            Err(WorkflowError::InvalidDate { field: "rental_date", .. })
        ));
    }

    #[test]
    fn custom_lines_normalize_measurements() {
        let input = RentalCustomInput {
            name: "  Barong Tagalog ".into(),
            tailoring_type: TailoringType::RentBack,
            price: 3500.0,
            quantity: 1,
            measurements: None,
            notes: None,
        };
        let line = resolve_custom(&input).unwrap();
        assert_eq!(line.name, "Barong Tagalog");
        assert!(line.measurements.as_object().is_some_and(|m| m.is_empty()));

        let bad = RentalCustomInput {
            measurements: Some(serde_json::json!([1, 2])),
            ..input.clone()
        };
        assert!(matches!(resolve_custom(&bad), Err(WorkflowError::Validation(_))));

        let blank = RentalCustomInput {
            name: "  ".into(),
            ..input
        };
        assert!(resolve_custom(&blank).is_err());
    }

    #[test]
    fn variation_items_cover_fulfillment() {
        let lines = StoredLines {
            items: vec![RentalItem {
                id: 1,
                rental_id: 1,
                item_id: 10,
                variation_id: 100,
                name: "Gown".into(),
                color: "Ivory".into(),
                size: "M".into(),
                price: 2500.0,
                quantity: 1,
            }],
            packages: vec![RentalPackage {
                id: 2,
                rental_id: 1,
                package_id: 5,
                name: "Entourage".into(),
                price: 8000.0,
                quantity: 1,
                fulfillment: vec![PackageFulfillment {
                    id: 3,
                    rental_package_id: 2,
                    role: "groom".into(),
                    item_id: 20,
                    variation_id: 200,
                    quantity: 1,
                }],
            }],
            custom_items: vec![],
        };
        let map = variation_items(&lines);
        assert_eq!(map.get(&100), Some(&10));
        assert_eq!(map.get(&200), Some(&20));
        assert_eq!(map.get(&300), None);
    }
}
