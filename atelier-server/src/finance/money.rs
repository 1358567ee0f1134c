//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

use super::FinanceError;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price (1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;
/// Maximum allowed single payment (10,000,000)
pub const MAX_PAYMENT_AMOUNT: f64 = 10_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 amount to cents
#[inline]
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field: &'static str) -> Result<(), FinanceError> {
    if !value.is_finite() {
        return Err(FinanceError::NotFinite { field, value });
    }
    Ok(())
}

/// Validate a non-negative amount bounded by `max`
pub fn validate_amount(value: f64, field: &'static str, max: f64) -> Result<(), FinanceError> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(FinanceError::Negative { field, value });
    }
    if value > max {
        return Err(FinanceError::TooLarge { field, value, max });
    }
    Ok(())
}

/// Validate a line quantity (1..=MAX_QUANTITY)
pub fn validate_quantity(value: i64, field: &'static str) -> Result<(), FinanceError> {
    if !(1..=MAX_QUANTITY).contains(&value) {
        return Err(FinanceError::InvalidQuantity {
            field,
            value,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_money(2.125), 2.13);
        assert_eq!(round_money(-2.125), -2.13);
        assert_eq!(round_money(1.004), 1.0);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(100.0, 100.004));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0, "price", MAX_PRICE).is_ok());
        assert!(matches!(
            validate_amount(-1.0, "price", MAX_PRICE),
            Err(FinanceError::Negative { .. })
        ));
        assert!(matches!(
            validate_amount(f64::NAN, "price", MAX_PRICE),
            Err(FinanceError::NotFinite { .. })
        ));
        assert!(matches!(
            validate_amount(MAX_PRICE + 1.0, "price", MAX_PRICE),
            Err(FinanceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1, "quantity").is_ok());
        assert!(validate_quantity(MAX_QUANTITY, "quantity").is_ok());
        assert!(validate_quantity(0, "quantity").is_err());
        assert!(validate_quantity(-3, "quantity").is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1, "quantity").is_err());
    }
}
