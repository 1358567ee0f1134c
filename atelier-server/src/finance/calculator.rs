//! 租赁金额计算器
//!
//! ```text
//! subtotal         = Σ price × qty                       (all lines)
//! required_deposit = Σ min(price, cap) × qty             (single items)
//!                  + package_deposit × qty               (packages)
//!                  + price × qty                         (rent-back custom items)
//! deposit_amount   = deposit_override ?? required_deposit
//! grand_total      = subtotal − shop_discount + deposit_amount
//! remaining        = grand_total − Σ payments
//! ```

use rust_decimal::Decimal;
use shared::models::{
    RentalCustomItem, RentalFinancials, RentalItem, RentalPackage, ReservationItem,
    ReservationPackage, ShopSettings, TailoringType,
};

use super::FinanceError;
use super::money::{
    MAX_PAYMENT_AMOUNT, MAX_PRICE, MONEY_TOLERANCE, to_decimal, to_f64, validate_amount,
    validate_quantity,
};

/// Deposit rules taken from the shop settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositPolicy {
    /// Per-unit deposit ceiling for single items
    pub single_item_cap: f64,
    /// Flat deposit per package
    pub package_deposit: f64,
}

impl From<&ShopSettings> for DepositPolicy {
    fn from(s: &ShopSettings) -> Self {
        Self {
            single_item_cap: s.single_item_deposit_cap,
            package_deposit: s.package_deposit,
        }
    }
}

/// A priced line, independent of where it is stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Line {
    Single { price: f64, quantity: i64 },
    Package { price: f64, quantity: i64 },
    Custom { price: f64, quantity: i64, tailoring: TailoringType },
}

impl Line {
    fn price_and_quantity(&self) -> (f64, i64) {
        match *self {
            Line::Single { price, quantity }
            | Line::Package { price, quantity }
            | Line::Custom { price, quantity, .. } => (price, quantity),
        }
    }

    fn validate(&self) -> Result<(), FinanceError> {
        let (price, quantity) = self.price_and_quantity();
        validate_amount(price, "price", MAX_PRICE)?;
        validate_quantity(quantity, "quantity")
    }
}

impl From<&RentalItem> for Line {
    fn from(l: &RentalItem) -> Self {
        Line::Single { price: l.price, quantity: l.quantity }
    }
}

impl From<&RentalPackage> for Line {
    fn from(l: &RentalPackage) -> Self {
        Line::Package { price: l.price, quantity: l.quantity }
    }
}

impl From<&RentalCustomItem> for Line {
    fn from(l: &RentalCustomItem) -> Self {
        Line::Custom {
            price: l.price,
            quantity: l.quantity,
            tailoring: l.tailoring_type,
        }
    }
}

impl From<&ReservationItem> for Line {
    fn from(l: &ReservationItem) -> Self {
        Line::Single { price: l.price, quantity: l.quantity }
    }
}

impl From<&ReservationPackage> for Line {
    fn from(l: &ReservationPackage) -> Self {
        Line::Package { price: l.price, quantity: l.quantity }
    }
}

/// Collect lines of a stored rental
pub fn rental_lines(
    items: &[RentalItem],
    packages: &[RentalPackage],
    custom: &[RentalCustomItem],
) -> Vec<Line> {
    items
        .iter()
        .map(Line::from)
        .chain(packages.iter().map(Line::from))
        .chain(custom.iter().map(Line::from))
        .collect()
}

/// Subtotal and required deposit of a set of lines
fn line_totals(lines: &[Line], policy: &DepositPolicy) -> Result<(Decimal, Decimal), FinanceError> {
    validate_amount(policy.single_item_cap, "single_item_deposit_cap", MAX_PRICE)?;
    validate_amount(policy.package_deposit, "package_deposit", MAX_PRICE)?;
    let cap = to_decimal(policy.single_item_cap);
    let package_deposit = to_decimal(policy.package_deposit);

    let mut subtotal = Decimal::ZERO;
    let mut deposit = Decimal::ZERO;
    for line in lines {
        line.validate()?;
        let (price, quantity) = line.price_and_quantity();
        let price = to_decimal(price);
        let qty = Decimal::from(quantity);
        subtotal += price * qty;
        deposit += match line {
            Line::Single { .. } => price.min(cap) * qty,
            Line::Package { .. } => package_deposit * qty,
            Line::Custom { tailoring: TailoringType::RentBack, .. } => price * qty,
            Line::Custom { tailoring: TailoringType::Purchase, .. } => Decimal::ZERO,
        };
    }
    Ok((subtotal, deposit))
}

/// Full financial summary of a rental
pub fn calculate(
    lines: &[Line],
    policy: &DepositPolicy,
    shop_discount: f64,
    deposit_override: Option<f64>,
    payments: &[f64],
) -> Result<RentalFinancials, FinanceError> {
    let (subtotal, required_deposit) = line_totals(lines, policy)?;

    validate_amount(shop_discount, "shop_discount", MAX_PRICE * 10.0)?;
    let discount = to_decimal(shop_discount);
    if discount > subtotal {
        return Err(FinanceError::DiscountExceedsSubtotal {
            discount: shop_discount,
            subtotal: to_f64(subtotal),
        });
    }

    let deposit_amount = match deposit_override {
        Some(value) => {
            validate_amount(value, "deposit_override", MAX_PRICE * 10.0)?;
            to_decimal(value)
        }
        None => required_deposit,
    };

    let mut total_paid = Decimal::ZERO;
    for &amount in payments {
        total_paid += to_decimal(amount);
    }

    let grand_total = subtotal - discount + deposit_amount;
    let remaining = grand_total - total_paid;

    Ok(RentalFinancials {
        subtotal: to_f64(subtotal),
        required_deposit: to_f64(required_deposit),
        deposit_amount: to_f64(deposit_amount),
        shop_discount: to_f64(discount),
        grand_total: to_f64(grand_total),
        total_paid: to_f64(total_paid),
        remaining_balance: to_f64(remaining),
    })
}

/// Estimate for a storefront request: no discount, no override, no payments
pub fn quote(lines: &[Line], policy: &DepositPolicy) -> Result<RentalFinancials, FinanceError> {
    calculate(lines, policy, 0.0, None, &[])
}

/// Check a new payment against the current balance
pub fn validate_payment(amount: f64, remaining_balance: f64) -> Result<(), FinanceError> {
    validate_amount(amount, "amount", MAX_PAYMENT_AMOUNT)?;
    if amount <= 0.0 {
        return Err(FinanceError::NonPositivePayment);
    }
    if to_decimal(amount) > to_decimal(remaining_balance) + MONEY_TOLERANCE {
        return Err(FinanceError::PaymentExceedsBalance {
            amount,
            remaining: remaining_balance,
        });
    }
    Ok(())
}

/// Reject edits that would leave more money collected than owed
pub fn ensure_not_overpaid(financials: &RentalFinancials) -> Result<(), FinanceError> {
    if to_decimal(financials.remaining_balance) < -MONEY_TOLERANCE {
        return Err(FinanceError::Overpaid {
            paid: financials.total_paid,
            grand_total: financials.grand_total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: DepositPolicy = DepositPolicy {
        single_item_cap: 1000.0,
        package_deposit: 3000.0,
    };

    #[test]
    fn single_item_deposit_is_capped_per_unit() {
        let lines = [
            Line::Single { price: 2500.0, quantity: 2 },
            Line::Single { price: 800.0, quantity: 1 },
        ];
        let f = quote(&lines, &POLICY).unwrap();
        assert_eq!(f.subtotal, 5800.0);
        // min(2500, 1000) × 2 + min(800, 1000) × 1
        assert_eq!(f.required_deposit, 2800.0);
        assert_eq!(f.grand_total, 8600.0);
        assert_eq!(f.remaining_balance, 8600.0);
    }

    #[test]
    fn package_deposit_is_flat_per_package() {
        let lines = [Line::Package { price: 15000.0, quantity: 2 }];
        let f = quote(&lines, &POLICY).unwrap();
        assert_eq!(f.subtotal, 30000.0);
        assert_eq!(f.required_deposit, 6000.0);
    }

    #[test]
    fn custom_items_deposit_depends_on_tailoring_type() {
        let lines = [
            Line::Custom { price: 4000.0, quantity: 1, tailoring: TailoringType::RentBack },
            Line::Custom { price: 2500.0, quantity: 2, tailoring: TailoringType::Purchase },
        ];
        let f = quote(&lines, &POLICY).unwrap();
        assert_eq!(f.subtotal, 9000.0);
        assert_eq!(f.required_deposit, 4000.0);
    }

    #[test]
    fn grand_total_and_balance_with_discount_and_payments() {
        let lines = [
            Line::Single { price: 1200.0, quantity: 1 },
            Line::Package { price: 8000.0, quantity: 1 },
        ];
        let f = calculate(&lines, &POLICY, 200.0, None, &[3000.0, 1500.5]).unwrap();
        assert_eq!(f.subtotal, 9200.0);
        assert_eq!(f.required_deposit, 4000.0);
        assert_eq!(f.deposit_amount, 4000.0);
        assert_eq!(f.grand_total, 13000.0);
        assert_eq!(f.total_paid, 4500.5);
        assert_eq!(f.remaining_balance, 8499.5);
    }

    #[test]
    fn deposit_override_replaces_required_deposit() {
        let lines = [Line::Single { price: 1200.0, quantity: 3 }];
        let f = calculate(&lines, &POLICY, 0.0, Some(500.0), &[]).unwrap();
        assert_eq!(f.required_deposit, 3000.0);
        assert_eq!(f.deposit_amount, 500.0);
        assert_eq!(f.grand_total, 4100.0);

        let waived = calculate(&lines, &POLICY, 0.0, Some(0.0), &[]).unwrap();
        assert_eq!(waived.deposit_amount, 0.0);
        assert_eq!(waived.grand_total, 3600.0);
    }

    #[test]
    fn discount_may_not_exceed_subtotal() {
        let lines = [Line::Single { price: 100.0, quantity: 1 }];
        assert!(calculate(&lines, &POLICY, 100.0, None, &[]).is_ok());
        assert!(matches!(
            calculate(&lines, &POLICY, 100.01, None, &[]),
            Err(FinanceError::DiscountExceedsSubtotal { .. })
        ));
    }

    #[test]
    fn empty_rental_totals_zero() {
        let f = calculate(&[], &POLICY, 0.0, None, &[]).unwrap();
        assert_eq!(f, RentalFinancials::default());
    }

    #[test]
    fn invalid_lines_are_rejected() {
        assert!(quote(&[Line::Single { price: -1.0, quantity: 1 }], &POLICY).is_err());
        assert!(quote(&[Line::Single { price: 10.0, quantity: 0 }], &POLICY).is_err());
        assert!(quote(&[Line::Package { price: f64::INFINITY, quantity: 1 }], &POLICY).is_err());
    }

    #[test]
    fn decimal_accumulation_has_no_float_drift() {
        let lines: Vec<Line> = (0..10)
            .map(|_| Line::Custom { price: 0.1, quantity: 1, tailoring: TailoringType::Purchase })
            .collect();
        let f = calculate(&lines, &POLICY, 0.0, None, &[0.3]).unwrap();
        assert_eq!(f.subtotal, 1.0);
        assert_eq!(f.remaining_balance, 0.7);
    }

    #[test]
    fn payment_rules() {
        assert!(validate_payment(100.0, 100.0).is_ok());
        assert!(validate_payment(100.005, 100.0).is_ok());
        assert!(matches!(
            validate_payment(100.5, 100.0),
            Err(FinanceError::PaymentExceedsBalance { .. })
        ));
        assert!(matches!(
            validate_payment(0.0, 100.0),
            Err(FinanceError::NonPositivePayment)
        ));
        assert!(validate_payment(-5.0, 100.0).is_err());
        assert!(validate_payment(10.0, 0.0).is_err());
    }

    #[test]
    fn overpaid_detection() {
        let lines = [Line::Single { price: 500.0, quantity: 1 }];
        let paid_in_full = calculate(&lines, &POLICY, 0.0, None, &[1000.0]).unwrap();
        assert!(ensure_not_overpaid(&paid_in_full).is_ok());

        let discounted = calculate(&lines, &POLICY, 100.0, None, &[1000.0]).unwrap();
        assert_eq!(discounted.remaining_balance, -100.0);
        assert!(matches!(
            ensure_not_overpaid(&discounted),
            Err(FinanceError::Overpaid { .. })
        ));
    }
}
