//! Stock allocation arithmetic
//!
//! An [`Allocation`] is how many units of each variation a rental holds.
//! Editing a rental is expressed as `diff(old, new)`, a [`StockDelta`] that the
//! ledger applies to the shelf.

use std::collections::BTreeMap;

use shared::models::{RentalItem, RentalPackage};

use super::StockError;

/// Units held per variation (`variation_id → quantity`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation(BTreeMap<i64, i64>);

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add units for a variation (non-positive quantities are ignored)
    pub fn add(&mut self, variation_id: i64, quantity: i64) {
        if quantity > 0 {
            *self.0.entry(variation_id).or_insert(0) += quantity;
        }
    }

    /// Units held for a variation (0 when absent)
    pub fn get(&self, variation_id: i64) -> i64 {
        self.0.get(&variation_id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().map(|(&id, &qty)| (id, qty))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_units(&self) -> i64 {
        self.0.values().sum()
    }

    /// Allocation of a stored rental: single items plus package fulfillment
    pub fn from_rental(items: &[RentalItem], packages: &[RentalPackage]) -> Self {
        let mut allocation = Self::new();
        for item in items {
            allocation.add(item.variation_id, item.quantity);
        }
        for package in packages {
            for garment in &package.fulfillment {
                allocation.add(garment.variation_id, garment.quantity);
            }
        }
        allocation
    }

    /// What goes back on the shelf once `damaged` units are held back
    pub fn without_damaged(&self, damaged: &Allocation) -> Result<Allocation, StockError> {
        for (variation_id, quantity) in damaged.iter() {
            let rented = self.get(variation_id);
            if quantity > rented {
                return Err(StockError::DamageExceedsRented {
                    variation_id,
                    damaged: quantity,
                    rented,
                });
            }
        }
        Ok(self
            .iter()
            .map(|(id, qty)| (id, qty - damaged.get(id)))
            .collect())
    }
}

impl FromIterator<(i64, i64)> for Allocation {
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        let mut allocation = Self::new();
        for (variation_id, quantity) in iter {
            allocation.add(variation_id, quantity);
        }
        allocation
    }
}

/// Signed per-variation stock change.
///
/// Positive: units return to the shelf. Negative: units leave it.
/// Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDelta(BTreeMap<i64, i64>);

impl StockDelta {
    /// Delta that takes every unit of `allocation` off the shelf
    pub fn take(allocation: &Allocation) -> Self {
        diff(&Allocation::new(), allocation)
    }

    /// Delta that puts every unit of `allocation` back on the shelf
    pub fn give_back(allocation: &Allocation) -> Self {
        diff(allocation, &Allocation::new())
    }

    pub fn get(&self, variation_id: i64) -> i64 {
        self.0.get(&variation_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries that add stock, as `(variation_id, units)`
    pub fn increments(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0
            .iter()
            .filter(|(_, d)| **d > 0)
            .map(|(&id, &d)| (id, d))
    }

    /// Entries that remove stock, as `(variation_id, units)` with positive units
    pub fn decrements(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0
            .iter()
            .filter(|(_, d)| **d < 0)
            .map(|(&id, &d)| (id, -d))
    }
}

/// Stock change needed to move a rental from `old` to `new` (`old − new` per variation)
pub fn diff(old: &Allocation, new: &Allocation) -> StockDelta {
    let mut delta = BTreeMap::new();
    for (id, qty) in old.iter() {
        delta.insert(id, qty);
    }
    for (id, qty) in new.iter() {
        *delta.entry(id).or_insert(0) -= qty;
    }
    delta.retain(|_, d| *d != 0);
    StockDelta(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PackageFulfillment;

    fn alloc(entries: &[(i64, i64)]) -> Allocation {
        entries.iter().copied().collect()
    }

    #[test]
    fn add_merges_same_variation() {
        let mut a = Allocation::new();
        a.add(1, 2);
        a.add(1, 3);
        a.add(2, 0);
        assert_eq!(a.get(1), 5);
        assert_eq!(a.get(2), 0);
        assert_eq!(a.total_units(), 5);
    }

    #[test]
    fn from_rental_counts_items_and_package_fulfillment() {
        let items = vec![RentalItem {
            id: 1,
            rental_id: 9,
            item_id: 100,
            variation_id: 10,
            name: "Barong".into(),
            color: "white".into(),
            size: "M".into(),
            price: 1500.0,
            quantity: 2,
        }];
        let packages = vec![RentalPackage {
            id: 2,
            rental_id: 9,
            package_id: 50,
            name: "Entourage".into(),
            price: 8000.0,
            quantity: 1,
            fulfillment: vec![
                PackageFulfillment {
                    id: 3,
                    rental_package_id: 2,
                    role: "groom".into(),
                    item_id: 100,
                    variation_id: 10,
                    quantity: 1,
                },
                PackageFulfillment {
                    id: 4,
                    rental_package_id: 2,
                    role: "bride".into(),
                    item_id: 200,
                    variation_id: 20,
                    quantity: 1,
                },
            ],
        }];
        let a = Allocation::from_rental(&items, &packages);
        assert_eq!(a, alloc(&[(10, 3), (20, 1)]));
    }

    #[test]
    fn diff_swap_returns_old_and_takes_new() {
        // Swap variation 1 (size M) for variation 2 (size L), keep variation 3
        let old = alloc(&[(1, 1), (3, 2)]);
        let new = alloc(&[(2, 1), (3, 2)]);
        let d = diff(&old, &new);
        assert_eq!(d.get(1), 1);
        assert_eq!(d.get(2), -1);
        assert_eq!(d.get(3), 0);
        assert_eq!(d.increments().collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(d.decrements().collect::<Vec<_>>(), vec![(2, 1)]);
    }

    #[test]
    fn diff_of_equal_allocations_is_empty() {
        let a = alloc(&[(1, 4), (2, 1)]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn take_and_give_back_are_symmetric() {
        let a = alloc(&[(1, 2), (5, 1)]);
        let take = StockDelta::take(&a);
        let back = StockDelta::give_back(&a);
        assert_eq!(take.decrements().collect::<Vec<_>>(), vec![(1, 2), (5, 1)]);
        assert_eq!(back.increments().collect::<Vec<_>>(), vec![(1, 2), (5, 1)]);
        assert_eq!(take.increments().count(), 0);
    }

    #[test]
    fn damaged_units_are_held_back() {
        let rented = alloc(&[(1, 3), (2, 1)]);
        let damaged = alloc(&[(1, 1), (2, 1)]);
        let shelf = rented.without_damaged(&damaged).unwrap();
        assert_eq!(shelf, alloc(&[(1, 2)]));
    }

    #[test]
    fn damage_cannot_exceed_rented_quantity() {
        let rented = alloc(&[(1, 1)]);
        assert!(matches!(
            rented.without_damaged(&alloc(&[(1, 2)])),
            Err(StockError::DamageExceedsRented { variation_id: 1, damaged: 2, rented: 1 })
        ));
        assert!(matches!(
            rented.without_damaged(&alloc(&[(7, 1)])),
            Err(StockError::DamageExceedsRented { variation_id: 7, .. })
        ));
    }
}
