//! Shop Settings API Handlers

use axum::{Extension, Json, extract::State};
use shared::models::{ShopSettings, ShopSettingsUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::settings;
use crate::finance::money::{MAX_PRICE, MAX_QUANTITY, validate_amount};
use crate::utils::time::parse_slot;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_email, validate_optional_text, validate_phone,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Upper bound on bookable slots per day
const MAX_SLOTS: usize = 48;

pub async fn get(State(state): State<ServerState>) -> AppResult<Json<ShopSettings>> {
    Ok(Json(settings::get(&state.pool).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(mut payload): Json<ShopSettingsUpdate>,
) -> AppResult<Json<ShopSettings>> {
    validate_update(&mut payload)?;
    let updated = settings::update(&state.pool, payload).await?;
    tracing::info!(updated_by = user.id, "Shop settings updated");
    Ok(Json(updated))
}

/// Checks every present field; slots come back trimmed, sorted and deduplicated
fn validate_update(data: &mut ShopSettingsUpdate) -> AppResult<()> {
    if let Some(name) = &data.shop_name {
        validate_required_text(name, "shop_name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = data.contact_phone.as_deref().filter(|p| !p.trim().is_empty()) {
        validate_phone(phone, "contact_phone")?;
    }
    if let Some(email) = data.contact_email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email, "contact_email")?;
    }
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;

    if let Some(cap) = data.single_item_deposit_cap {
        validate_amount(cap, "single_item_deposit_cap", MAX_PRICE)?;
    }
    if let Some(deposit) = data.package_deposit {
        validate_amount(deposit, "package_deposit", MAX_PRICE)?;
    }
    if let Some(threshold) = data.low_stock_threshold
        && !(0..=MAX_QUANTITY).contains(&threshold)
    {
        return Err(AppError::validation(format!(
            "low_stock_threshold must be between 0 and {MAX_QUANTITY}"
        ))
        .with_detail("field", "low_stock_threshold"));
    }
    if let Some(capacity) = data.appointment_slot_capacity
        && !(1..=MAX_QUANTITY).contains(&capacity)
    {
        return Err(AppError::validation(format!(
            "appointment_slot_capacity must be between 1 and {MAX_QUANTITY}"
        ))
        .with_detail("field", "appointment_slot_capacity"));
    }

    if let Some(slots) = data.appointment_slots.take() {
        data.appointment_slots = Some(normalize_slots(slots)?);
    }
    Ok(())
}

fn normalize_slots(slots: Vec<String>) -> AppResult<Vec<String>> {
    if slots.is_empty() || slots.len() > MAX_SLOTS {
        return Err(AppError::validation(format!(
            "appointment_slots must contain between 1 and {MAX_SLOTS} entries"
        ))
        .with_detail("field", "appointment_slots"));
    }
    let mut out = slots
        .iter()
        .map(|s| parse_slot(s).map(|_| s.trim().to_string()))
        .collect::<AppResult<Vec<_>>>()?;
    // HH:MM sorts chronologically as text
    out.sort();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_sorted_and_deduplicated() {
        let slots = normalize_slots(vec![" 14:00".into(), "09:30".into(), "14:00".into()]).unwrap();
        assert_eq!(slots, vec!["09:30", "14:00"]);
    }

    #[test]
    fn bad_slots_are_rejected() {
        assert!(normalize_slots(vec![]).is_err());
        assert!(normalize_slots(vec!["9:00".into()]).is_err());
        assert!(normalize_slots(vec!["25:00".into()]).is_err());
    }

    #[test]
    fn update_rules() {
        let mut ok = ShopSettingsUpdate {
            appointment_slot_capacity: Some(3),
            package_deposit: Some(1500.0),
            ..Default::default()
        };
        assert!(validate_update(&mut ok).is_ok());

        let mut zero_capacity = ShopSettingsUpdate {
            appointment_slot_capacity: Some(0),
            ..Default::default()
        };
        assert!(validate_update(&mut zero_capacity).is_err());

        let mut negative_deposit = ShopSettingsUpdate {
            single_item_deposit_cap: Some(-1.0),
            ..Default::default()
        };
        assert!(validate_update(&mut negative_deposit).is_err());

        let mut blank_name = ShopSettingsUpdate {
            shop_name: Some("  ".into()),
            ..Default::default()
        };
        assert!(validate_update(&mut blank_name).is_err());
    }
}
