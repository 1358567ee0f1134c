//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so handlers check lengths
//! before anything reaches a repository.

use shared::models::{CustomerInfo, FulfillmentInput, RentalCustomInput, RentalLines};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: item, package, category, employee display name, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Long-form storefront content (FAQ, policies)
pub const MAX_CONTENT_LEN: usize = 20_000;

/// Short identifiers: phone, color, size, payment reference, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_PASSWORD_LEN: usize = 8;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Loose email shape check: one `@`, something on both sides, a dot in the domain.
pub fn validate_email(value: &str, field: &str) -> Result<(), AppError> {
    let value = value.trim();
    let valid = value.len() <= MAX_EMAIL_LEN
        && value.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !valid {
        return Err(AppError::validation(format!("{field} is not a valid email address"))
            .with_detail("field", field));
    }
    Ok(())
}

/// Phone numbers: digits with optional `+`, spaces, dashes, dots and parentheses.
pub fn validate_phone(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_SHORT_TEXT_LEN)?;
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !allowed || digits < 5 {
        return Err(AppError::validation(format!("{field} is not a valid phone number"))
            .with_detail("field", field));
    }
    Ok(())
}

/// Employee passwords, checked before hashing
pub fn validate_password(value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}

/// Customer contact block shared by rentals, reservations and appointments
pub fn validate_customer(customer: &CustomerInfo) -> Result<(), AppError> {
    validate_required_text(&customer.name, "customer.name", MAX_NAME_LEN)?;
    validate_phone(&customer.phone, "customer.phone")?;
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email, "customer.email")?;
    }
    validate_optional_text(&customer.address, "customer.address", MAX_ADDRESS_LEN)
}

/// Free-text parts of rental lines; quantities and prices are checked by the workflow
pub fn validate_rental_lines(lines: &RentalLines) -> Result<(), AppError> {
    validate_line_text(
        lines.packages.iter().flat_map(|p| &p.fulfillment),
        &lines.custom_items,
    )
}

/// Fulfillment roles and custom tailoring text, wherever package lines come from
pub fn validate_line_text<'a>(
    fulfillment: impl IntoIterator<Item = &'a FulfillmentInput>,
    custom_items: &[RentalCustomInput],
) -> Result<(), AppError> {
    for f in fulfillment {
        validate_required_text(&f.role, "fulfillment.role", MAX_SHORT_TEXT_LEN)?;
    }
    for c in custom_items {
        validate_required_text(&c.name, "custom_items.name", MAX_NAME_LEN)?;
        validate_optional_text(&c.notes, "custom_items.notes", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// Trim every field and drop blank optionals
pub fn normalize_customer(customer: CustomerInfo) -> CustomerInfo {
    let blank_to_none = |v: Option<String>| {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    };
    CustomerInfo {
        name: customer.name.trim().to_string(),
        phone: customer.phone.trim().to_string(),
        email: blank_to_none(customer.email),
        address: blank_to_none(customer.address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(phone: &str, email: Option<&str>) -> CustomerInfo {
        CustomerInfo {
            name: "Maria Santos".into(),
            phone: phone.into(),
            email: email.map(Into::into),
            address: None,
        }
    }

    #[test]
    fn required_text_rules() {
        assert!(validate_required_text("Barong", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "notes", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&None, "notes", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn customer_contact_rules() {
        assert!(validate_customer(&customer("+63 (917) 555-0101", Some("m@example.ph"))).is_ok());
        assert!(validate_customer(&customer("0917", None)).is_err());
        assert!(validate_customer(&customer("call me", None)).is_err());
        assert!(validate_customer(&customer("09175550101", Some("not-an-email"))).is_err());
        // blank email is treated as absent
        assert!(validate_customer(&customer("09175550101", Some("  "))).is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("a@b.co", "email").is_ok());
        assert!(validate_email("@b.co", "email").is_err());
        assert!(validate_email("a@b", "email").is_err());
        assert!(validate_email("a@@b.co", "email").is_err());
        assert!(validate_email("a@.co", "email").is_err());
    }

    #[test]
    fn normalize_trims_and_drops_blanks() {
        let c = normalize_customer(CustomerInfo {
            name: "  Ana ".into(),
            phone: " 0917 ".into(),
            email: Some(" ".into()),
            address: Some(" Quezon City ".into()),
        });
        assert_eq!(c.name, "Ana");
        assert_eq!(c.phone, "0917");
        assert_eq!(c.email, None);
        assert_eq!(c.address.as_deref(), Some("Quezon City"));
    }

    #[test]
    fn line_text_rules_cover_rentals_and_conversions() {
        let role = |r: &str| FulfillmentInput {
            role: r.into(),
            variation_id: 1,
            quantity: 1,
        };
        let custom = |name: &str| RentalCustomInput {
            name: name.into(),
            tailoring_type: shared::models::TailoringType::Purchase,
            price: 1500.0,
            quantity: 1,
            measurements: None,
            notes: None,
        };

        let assignments = [vec![role("groom")], vec![role("best man"), role(" ")]];
        assert!(validate_line_text(assignments.iter().flatten(), &[]).is_err());
        assert!(validate_line_text(assignments[0].iter(), &[custom("Barong")]).is_ok());
        assert!(validate_line_text(&[] as &[FulfillmentInput], &[custom("  ")]).is_err());

        let lines = RentalLines {
            items: vec![],
            packages: vec![shared::models::RentalPackageInput {
                package_id: 1,
                quantity: 1,
                fulfillment: vec![role("")],
            }],
            custom_items: vec![],
        };
        assert!(validate_rental_lines(&lines).is_err());
    }
}
