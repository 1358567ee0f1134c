//! Damaged item handling
//!
//! A damaged unit leaves the shelf count when the rental comes back. Resolving
//! the record as `repaired` puts it back on the shelf; `disposed` writes it off.

use shared::models::{DamageResolve, DamageStatus, DamagedItem};
use sqlx::SqlitePool;

use super::WorkflowError;
use crate::db::repository::damaged_item;
use crate::inventory::ledger;

pub async fn list(
    pool: &SqlitePool,
    status: Option<DamageStatus>,
) -> Result<Vec<DamagedItem>, WorkflowError> {
    Ok(damaged_item::list(pool, status).await?)
}

/// Close an `awaiting_repair` record
pub async fn resolve(
    pool: &SqlitePool,
    id: i64,
    data: DamageResolve,
) -> Result<DamagedItem, WorkflowError> {
    if data.status == DamageStatus::AwaitingRepair {
        return Err(WorkflowError::Validation(
            "Resolution must be repaired or disposed".into(),
        ));
    }

    let mut tx = pool.begin().await?;
    let record = damaged_item::find_by_id(&mut tx, id)
        .await?
        .ok_or(WorkflowError::DamageNotFound(id))?;

    let now = shared::util::now_millis();
    if !damaged_item::resolve(&mut tx, id, data.status, data.notes.as_deref(), now).await? {
        return Err(WorkflowError::DamageAlreadyResolved(id));
    }

    if data.status == DamageStatus::Repaired {
        let shelf = ledger::adjust(&mut tx, record.variation_id, record.quantity).await?;
        tracing::info!(
            damaged_item_id = id,
            variation_id = record.variation_id,
            units = record.quantity,
            shelf_quantity = shelf,
            "Repaired units returned to stock"
        );
    } else {
        tracing::info!(
            damaged_item_id = id,
            variation_id = record.variation_id,
            units = record.quantity,
            "Damaged units disposed"
        );
    }

    let resolved = damaged_item::find_by_id(&mut tx, id)
        .await?
        .ok_or(WorkflowError::DamageNotFound(id))?;
    tx.commit().await?;
    Ok(resolved)
}
