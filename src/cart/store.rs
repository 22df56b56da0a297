use std::sync::Arc;

use tracing::{debug, warn};

use super::line::{rehydrate, CartLine};
use crate::catalog::MenuItem;
use crate::id::EntityId;
use crate::storage::{keys, KeyValueStore};

/// Outcome of a signed quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyChange {
    Missing,
    Updated(u32),
    Removed,
}

/// Owner of the cart lines. Every mutation swaps in a fresh snapshot and writes it through.
pub struct CartStore {
    lines: Arc<[CartLine]>,
    is_open: bool,
    storage: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Rehydrates from the `cart_items` slot; unreadable storage gives an empty cart.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let lines = match storage.get(keys::CART_ITEMS) {
            Ok(Some(raw)) => rehydrate(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "cart storage unavailable; starting empty");
                Vec::new()
            }
        };
        debug!(lines = lines.len(), "cart loaded");
        Self {
            lines: lines.into(),
            is_open: false,
            storage,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// A consistent view that later mutations never touch.
    pub fn snapshot(&self) -> Arc<[CartLine]> {
        Arc::clone(&self.lines)
    }

    pub fn get(&self, id: &EntityId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cart_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.qty)).sum()
    }

    pub fn cart_total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Returns the line's quantity after the add.
    pub fn add_to_cart(&mut self, item: &MenuItem) -> u32 {
        let mut next = self.lines.to_vec();
        let qty = match next.iter_mut().find(|l| l.id == item.id) {
            Some(line) => {
                line.qty = line.qty.saturating_add(1);
                line.qty
            }
            None => {
                next.push(CartLine::from_item(item));
                1
            }
        };
        self.commit(next);
        qty
    }

    pub fn remove_from_cart(&mut self, id: &EntityId) -> Option<CartLine> {
        let pos = self.lines.iter().position(|l| &l.id == id)?;
        let mut next = self.lines.to_vec();
        let removed = next.remove(pos);
        self.commit(next);
        Some(removed)
    }

    pub fn update_qty(&mut self, id: &EntityId, delta: i64) -> QtyChange {
        let Some(pos) = self.lines.iter().position(|l| &l.id == id) else {
            return QtyChange::Missing;
        };
        let new_qty = i64::from(self.lines[pos].qty).saturating_add(delta);
        let mut next = self.lines.to_vec();
        let change = if new_qty <= 0 {
            next.remove(pos);
            QtyChange::Removed
        } else {
            let qty = u32::try_from(new_qty).unwrap_or(u32::MAX);
            next[pos].qty = qty;
            QtyChange::Updated(qty)
        };
        self.commit(next);
        change
    }

    pub fn clear_cart(&mut self) {
        self.commit(Vec::new());
    }

    pub fn open_cart(&mut self) {
        self.is_open = true;
    }

    pub fn close_cart(&mut self) {
        self.is_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn commit(&mut self, next: Vec<CartLine>) {
        self.lines = next.into();
        self.persist();
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(&*self.lines) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "cart serialization failed; not persisted");
                return;
            }
        };
        if let Err(e) = self.storage.set(keys::CART_ITEMS, &payload) {
            warn!(error = %e, "cart persistence failed; in-memory cart kept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use proptest::prelude::*;

    fn item(id: i64, name: &str, price: f64) -> MenuItem {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": name, "price": price, "image": format!("{name}.jpg")
        }))
        .unwrap()
    }

    fn store() -> (CartStore, Arc<MemoryStore>) {
        let mem = Arc::new(MemoryStore::new());
        (CartStore::load(mem.clone()), mem)
    }

    struct BrokenStore;
    impl KeyValueStore for BrokenStore {
        fn get(&self, _k: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }
        fn set(&self, _k: &str, _v: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
        fn remove(&self, _k: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn add_increments_existing_line() {
        let (mut cart, _) = store();
        let burger = item(1, "Burger", 150.0);
        assert_eq!(cart.add_to_cart(&burger), 1);
        assert_eq!(cart.add_to_cart(&burger), 2);
        cart.add_to_cart(&item(2, "Pizza", 300.0));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.cart_count(), 3);
        assert_eq!(cart.cart_total(), 600.0);
    }

    #[test]
    fn update_qty_to_zero_removes_line() {
        let (mut cart, _) = store();
        let burger = item(1, "Burger", 150.0);
        cart.add_to_cart(&burger);
        cart.add_to_cart(&burger);
        assert_eq!(cart.update_qty(&burger.id, 1), QtyChange::Updated(3));
        assert_eq!(cart.update_qty(&burger.id, -3), QtyChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.update_qty(&burger.id, 1), QtyChange::Missing);
    }

    #[test]
    fn remove_missing_is_noop() {
        let (mut cart, mem) = store();
        cart.add_to_cart(&item(1, "Burger", 150.0));
        let before = mem.get(keys::CART_ITEMS).unwrap();
        assert!(cart.remove_from_cart(&EntityId::Int(99)).is_none());
        assert_eq!(mem.get(keys::CART_ITEMS).unwrap(), before);
        assert_eq!(cart.remove_from_cart(&EntityId::Int(1)).map(|l| l.qty), Some(1));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_mutations() {
        let (mut cart, _) = store();
        cart.add_to_cart(&item(1, "Burger", 150.0));
        let snap = cart.snapshot();
        cart.clear_cart();
        assert_eq!(snap.len(), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn persistence_round_trip() {
        let (mut cart, mem) = store();
        cart.add_to_cart(&item(1, "Burger", 150.0));
        cart.add_to_cart(&item(2, "Pizza", 300.0));
        cart.update_qty(&EntityId::Int(2), 2);

        let reloaded = CartStore::load(mem);
        assert_eq!(reloaded.cart_count(), cart.cart_count());
        assert_eq!(reloaded.cart_total(), cart.cart_total());
        assert_eq!(reloaded.lines(), cart.lines());
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut cart = CartStore::load(Arc::new(BrokenStore));
        assert!(cart.is_empty());
        cart.add_to_cart(&item(1, "Burger", 150.0));
        assert_eq!(cart.cart_count(), 1);
    }

    #[test]
    fn visibility_flag() {
        let (mut cart, _) = store();
        assert!(!cart.is_open());
        cart.open_cart();
        assert!(cart.is_open());
        cart.close_cart();
        assert!(!cart.is_open());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64),
        Remove(i64),
        Update(i64, i64),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0_i64..5).prop_map(Op::Add),
            1 => (0_i64..5).prop_map(Op::Remove),
            3 => ((0_i64..5), (-4_i64..4)).prop_map(|(id, d)| Op::Update(id, d)),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn cart_invariants_hold_for_any_sequence(ops in proptest::collection::vec(op(), 0..60)) {
            let (mut cart, mem) = store();
            for op in ops {
                match op {
                    Op::Add(id) => { cart.add_to_cart(&item(id, &format!("dish-{id}"), (id * 10) as f64)); }
                    Op::Remove(id) => { cart.remove_from_cart(&EntityId::Int(id)); }
                    Op::Update(id, d) => { cart.update_qty(&EntityId::Int(id), d); }
                    Op::Clear => cart.clear_cart(),
                }
                let sum: u64 = cart.lines().iter().map(|l| u64::from(l.qty)).sum();
                prop_assert_eq!(cart.cart_count(), sum);
                prop_assert!(cart.lines().iter().all(|l| l.qty >= 1));
                let mut ids: Vec<_> = cart.lines().iter().map(|l| l.id.clone()).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), cart.lines().len());
            }
            let reloaded = CartStore::load(mem);
            prop_assert_eq!(reloaded.cart_count(), cart.cart_count());
            prop_assert_eq!(reloaded.cart_total(), cart.cart_total());
        }
    }
}
