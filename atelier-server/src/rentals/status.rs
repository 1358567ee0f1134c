//! 租赁状态机
//!
//! ```text
//! pending ──► to_pickup ──► to_return ──► returned ──► completed
//!    │            │             │  └──────────────────────▲
//!    └────────────┴─────────────┴──► cancelled
//! ```

use shared::models::RentalStatus;

/// What a transition does to the stock held by the rental
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Garments stay where they are
    None,
    /// Put non-damaged garments back on the shelf, record the damaged ones
    Restore,
    /// Undo every decrement of the rental
    Reverse,
}

/// Whether `from → to` is allowed
pub fn can_transition(from: RentalStatus, to: RentalStatus) -> bool {
    use RentalStatus::*;
    matches!(
        (from, to),
        (Pending, ToPickup | ToReturn | Cancelled)
            | (ToPickup, ToReturn | Cancelled)
            | (ToReturn, Returned | Completed | Cancelled)
            | (Returned, Completed)
    )
}

/// Stock effect of entering `to`, given whether the rental is already settled
pub fn stock_effect(to: RentalStatus, stock_settled: bool) -> StockEffect {
    if stock_settled {
        return StockEffect::None;
    }
    match to {
        RentalStatus::Returned | RentalStatus::Completed => StockEffect::Restore,
        RentalStatus::Cancelled => StockEffect::Reverse,
        _ => StockEffect::None,
    }
}

/// Lines may be edited while garments are still accounted to the rental
pub fn lines_editable(status: RentalStatus) -> bool {
    matches!(
        status,
        RentalStatus::Pending | RentalStatus::ToPickup | RentalStatus::ToReturn
    )
}

pub fn is_terminal(status: RentalStatus) -> bool {
    matches!(status, RentalStatus::Completed | RentalStatus::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RentalStatus::*;

    const ALL: [RentalStatus; 6] = [Pending, ToPickup, ToReturn, Returned, Completed, Cancelled];

    #[test]
    fn transition_table() {
        let allowed = [
            (Pending, ToPickup),
            (Pending, ToReturn),
            (Pending, Cancelled),
            (ToPickup, ToReturn),
            (ToPickup, Cancelled),
            (ToReturn, Returned),
            (ToReturn, Completed),
            (ToReturn, Cancelled),
            (Returned, Completed),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    can_transition(from, to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for to in ALL {
            assert!(!can_transition(Completed, to));
            assert!(!can_transition(Cancelled, to));
        }
        assert!(is_terminal(Completed));
        assert!(!is_terminal(Returned));
    }

    #[test]
    fn returned_then_completed_restores_once() {
        assert_eq!(stock_effect(Returned, false), StockEffect::Restore);
        // returned already settled the stock
        assert_eq!(stock_effect(Completed, true), StockEffect::None);
        assert_eq!(stock_effect(Completed, false), StockEffect::Restore);
    }

    #[test]
    fn cancel_reverses_unless_settled() {
        assert_eq!(stock_effect(Cancelled, false), StockEffect::Reverse);
        assert_eq!(stock_effect(Cancelled, true), StockEffect::None);
        assert_eq!(stock_effect(ToPickup, false), StockEffect::None);
    }

    #[test]
    fn editable_statuses() {
        assert!(lines_editable(Pending));
        assert!(lines_editable(ToReturn));
        assert!(!lines_editable(Returned));
        assert!(!lines_editable(Cancelled));
    }
}
