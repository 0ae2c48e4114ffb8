//! # Cart
//!
//! The shopping cart as a reducer over a tagged action enum, plus the
//! `CartStore` that owns the current state and persists it.
//!
//! ## State Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart State Flow                                 │
//! │                                                                         │
//! │   UI intent                CartAction              reduce()             │
//! │   ─────────                ──────────              ────────             │
//! │   "Add to cart" ─────────► AddItem(item) ────────► merge or append      │
//! │   "Remove"      ─────────► RemoveItem(id) ───────► drop line            │
//! │   qty stepper   ─────────► UpdateQuantity ───────► set / drop if <= 0   │
//! │   order placed  ─────────► Clear ────────────────► empty                │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                              CartStore::dispatch ── save("cart", json)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `total == Σ price × quantity`, recomputed on every transition
//! - No two lines share an `id`
//! - Every line has `quantity >= 1` and a non-negative price
//! - Lines keep insertion order
//! - An action whose total would leave the i64 cent range changes nothing
//!
//! The fields of `CartState` are private so the total can never drift from
//! the items.

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, StorageError};
use crate::money::Money;
use crate::storage::CartStorage;
use crate::types::CartItem;
use crate::validation::validate_cart_item;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cart";

// =============================================================================
// Cart State
// =============================================================================

/// An immutable snapshot of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    items: Vec<CartItem>,
    total: Money,
}

impl CartState {
    /// The empty cart.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `None` when a line total or the cart total does not fit in i64 cents.
    fn try_from_items(items: Vec<CartItem>) -> Option<Self> {
        let total = items
            .iter()
            .try_fold(Money::zero(), |sum, item| sum.checked_add(item.line_total()?))?;
        Some(CartState { items, total })
    }

    /// The state for `items`, or `self` unchanged if their total overflows.
    fn with_items(&self, items: Vec<CartItem>) -> Self {
        Self::try_from_items(items).unwrap_or_else(|| self.clone())
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |count, i| count.saturating_add(i.quantity))
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// True when at least one line is prescription-only.
    pub fn requires_prescription(&self) -> bool {
        self.items.iter().any(|i| i.requires_prescription)
    }

    /// Ids of prescription-only lines, in cart order.
    pub fn prescription_item_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.requires_prescription)
            .map(|i| i.id.clone())
            .collect()
    }
}

// =============================================================================
// Actions & Reducer
// =============================================================================

/// Every way the cart can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Merge into an existing line with the same id, else append.
    AddItem(CartItem),
    /// Drop the line; unknown ids are ignored.
    RemoveItem(String),
    /// Replace the quantity; `quantity <= 0` removes the line.
    UpdateQuantity { id: String, quantity: i64 },
    /// Empty the cart.
    Clear,
}

/// Pure cart transition.
///
/// ## Rules
/// - `AddItem` with a known id sums the quantities and keeps the existing
///   line's price and name
/// - `AddItem` with a quantity below 1 or a negative price is ignored
/// - `RemoveItem` / `UpdateQuantity` on an absent id return the state as is
/// - `UpdateQuantity` with `quantity <= 0` behaves exactly like `RemoveItem`
/// - A quantity or total that would overflow leaves the state as is
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem(item) => {
            if validate_cart_item(&item).is_err() {
                return state.clone();
            }
            let mut items = state.items.clone();
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => match existing.quantity.checked_add(item.quantity) {
                    Some(quantity) => existing.quantity = quantity,
                    None => return state.clone(),
                },
                None => items.push(item),
            }
            state.with_items(items)
        }
        CartAction::RemoveItem(id) => {
            if state.get(&id).is_none() {
                return state.clone();
            }
            let items = state.items.iter().filter(|i| i.id != id).cloned().collect();
            state.with_items(items)
        }
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                return reduce(state, CartAction::RemoveItem(id));
            }
            if state.get(&id).is_none() {
                return state.clone();
            }
            let items = state
                .items
                .iter()
                .map(|i| {
                    if i.id == id {
                        CartItem {
                            quantity,
                            ..i.clone()
                        }
                    } else {
                        i.clone()
                    }
                })
                .collect();
            state.with_items(items)
        }
        CartAction::Clear => CartState::empty(),
    }
}

// =============================================================================
// Persistence Format
// =============================================================================

/// What a previous session left behind. `total` is ignored on the way in and
/// recomputed from the items.
#[derive(Debug, Deserialize)]
struct PersistedCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

/// Rebuilds a cart from its persisted JSON by replaying `Clear` followed by
/// one `AddItem` per stored line.
///
/// Malformed JSON yields the empty cart. Lines `AddItem` would refuse
/// (quantity below 1, negative price, overflowing total) are dropped;
/// duplicate ids merge.
pub fn rehydrate(json: &str) -> CartState {
    let persisted: PersistedCart = match serde_json::from_str(json) {
        Ok(p) => p,
        Err(_) => return CartState::empty(),
    };

    persisted
        .items
        .into_iter()
        .fold(reduce(&CartState::empty(), CartAction::Clear), |state, item| {
            reduce(&state, CartAction::AddItem(item))
        })
}

// =============================================================================
// Cart Store
// =============================================================================

/// Owns the live cart and writes it through to storage after every change.
///
/// ## Usage
/// ```rust
/// use pharma_core::cart::CartStore;
/// use pharma_core::storage::MemoryStorage;
/// use pharma_core::{CartItem, Money};
///
/// let mut store = CartStore::open(MemoryStorage::new()).unwrap();
/// store.add_item(CartItem::new("vit-c", "Vitamin C", Money::from_cents(1000), 2)).unwrap();
/// store.add_item(CartItem::new("vit-c", "Vitamin C", Money::from_cents(1000), 3)).unwrap();
///
/// assert_eq!(store.state().items()[0].quantity, 5);
/// assert_eq!(store.state().total(), Money::from_cents(5000));
/// ```
///
/// ## Persistence Failures
/// The in-memory transition always happens. When the following `save`
/// fails, `dispatch` returns `CoreError::Storage` and the caller decides
/// whether to tell the user; the next successful save catches storage up.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    state: CartState,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Loads the persisted cart, or starts empty when nothing usable is stored.
    ///
    /// A storage read failure is returned as an error; a malformed stored
    /// value is not.
    pub fn open(storage: S) -> CoreResult<Self> {
        let state = match storage.load(CART_STORAGE_KEY)? {
            Some(json) => rehydrate(&json),
            None => CartState::empty(),
        };
        Ok(CartStore { state, storage })
    }

    /// Applies `action`, then persists the resulting state.
    pub fn dispatch(&mut self, action: CartAction) -> CoreResult<&CartState> {
        self.state = reduce(&self.state, action);
        self.persist()?;
        Ok(&self.state)
    }

    pub fn add_item(&mut self, item: CartItem) -> CoreResult<&CartState> {
        self.dispatch(CartAction::AddItem(item))
    }

    pub fn remove_item(&mut self, id: impl Into<String>) -> CoreResult<&CartState> {
        self.dispatch(CartAction::RemoveItem(id.into()))
    }

    pub fn update_quantity(
        &mut self,
        id: impl Into<String>,
        quantity: i64,
    ) -> CoreResult<&CartState> {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        })
    }

    pub fn clear(&mut self) -> CoreResult<&CartState> {
        self.dispatch(CartAction::Clear)
    }

    /// Current snapshot.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.state)?;
        self.storage.save(CART_STORAGE_KEY, &json)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStorage;

    fn item(id: &str, cents: i64, quantity: i64) -> CartItem {
        CartItem::new(id, id.to_uppercase(), Money::from_cents(cents), quantity)
    }

    fn expected_total(state: &CartState) -> Money {
        state
            .items()
            .iter()
            .map(|i| i.price.checked_mul_quantity(i.quantity).unwrap())
            .sum()
    }

    /// Storage whose writes always fail.
    #[derive(Debug)]
    struct ReadOnlyStorage;

    impl CartStorage for ReadOnlyStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "disk full".to_string(),
            })
        }
    }

    /// Storage whose reads always fail.
    #[derive(Debug)]
    struct UnreadableStorage;

    impl CartStorage for UnreadableStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: "permission denied".to_string(),
            })
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_add_merges_same_id() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1000, 2)));
        let state = reduce(&state, CartAction::AddItem(item("a", 1000, 3)));

        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity, 5);
        assert_eq!(state.total(), Money::from_cents(5000));
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut state = CartState::empty();
        for id in ["c", "a", "b"] {
            state = reduce(&state, CartAction::AddItem(item(id, 100, 1)));
        }
        state = reduce(&state, CartAction::AddItem(item("a", 100, 1)));

        let ids: Vec<&str> = state.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_add_ignores_non_positive_quantity() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 100, 0)));
        assert!(state.is_empty());
    }

    #[test]
    fn test_add_ignores_negative_price() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1000, 1)));
        let after = reduce(&state, CartAction::AddItem(item("neg", -5000, 1)));
        assert_eq!(after, state);
        assert_eq!(after.total(), Money::from_cents(1000));

        // Free samples are fine
        let after = reduce(&state, CartAction::AddItem(item("sample", 0, 1)));
        assert_eq!(after.items().len(), 2);
    }

    #[test]
    fn test_add_overflowing_total_is_noop() {
        // $10 × 2^62 does not fit in i64 cents
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1000, 1 << 62)));
        assert!(state.is_empty());

        let base = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1000, 1)));
        let state = reduce(&base, CartAction::AddItem(item("b", 1, i64::MAX)));
        assert_eq!(state, base);
    }

    #[test]
    fn test_add_overflowing_quantity_is_noop() {
        let base = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1, 1 << 62)));
        assert_eq!(base.items()[0].quantity, 1 << 62);

        let state = reduce(&base, CartAction::AddItem(item("a", 1, 1 << 62)));
        assert_eq!(state, base);
        assert_eq!(state.total(), Money::from_cents(1 << 62));

        let state = reduce(&base, CartAction::AddItem(item("a", 1, i64::MAX)));
        assert_eq!(state, base);
    }

    #[test]
    fn test_update_overflowing_quantity_is_noop() {
        let base = reduce(&CartState::empty(), CartAction::AddItem(item("a", 1000, 2)));
        let state = reduce(
            &base,
            CartAction::UpdateQuantity {
                id: "a".to_string(),
                quantity: i64::MAX,
            },
        );
        assert_eq!(state, base);
        assert_eq!(state.total(), expected_total(&state));
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let base = reduce(&CartState::empty(), CartAction::AddItem(item("a", 250, 2)));
        let base = reduce(&base, CartAction::AddItem(item("b", 100, 1)));

        let removed = reduce(&base, CartAction::RemoveItem("a".to_string()));
        for quantity in [0, -1, -50] {
            let updated = reduce(
                &base,
                CartAction::UpdateQuantity {
                    id: "a".to_string(),
                    quantity,
                },
            );
            assert_eq!(updated, removed);
        }
    }

    #[test]
    fn test_update_quantity_replaces() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 250, 2)));
        let state = reduce(
            &state,
            CartAction::UpdateQuantity {
                id: "a".to_string(),
                quantity: 7,
            },
        );
        assert_eq!(state.items()[0].quantity, 7);
        assert_eq!(state.total(), Money::from_cents(1750));
    }

    #[test]
    fn test_absent_id_is_noop() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 250, 2)));

        let after_remove = reduce(&state, CartAction::RemoveItem("zzz".to_string()));
        assert_eq!(after_remove, state);

        let after_update = reduce(
            &state,
            CartAction::UpdateQuantity {
                id: "zzz".to_string(),
                quantity: 4,
            },
        );
        assert_eq!(after_update, state);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let state = reduce(&CartState::empty(), CartAction::AddItem(item("a", 250, 2)));
        let once = reduce(&state, CartAction::Clear);
        let twice = reduce(&once, CartAction::Clear);
        assert_eq!(once, twice);
        assert!(once.is_empty());
        assert!(once.total().is_zero());
    }

    #[test]
    fn test_total_invariant_over_mixed_sequence() {
        let actions = vec![
            CartAction::AddItem(item("a", 199, 3)),
            CartAction::AddItem(item("b", 1050, 1)),
            CartAction::AddItem(item("a", 199, 2)),
            CartAction::UpdateQuantity {
                id: "b".to_string(),
                quantity: 4,
            },
            CartAction::AddItem(item("c", 5, 100)),
            CartAction::RemoveItem("a".to_string()),
            CartAction::UpdateQuantity {
                id: "c".to_string(),
                quantity: 0,
            },
            CartAction::AddItem(item("d", 9999, 1)),
        ];

        let mut state = CartState::empty();
        for action in actions {
            state = reduce(&state, action);
            assert_eq!(state.total(), expected_total(&state));
            assert!(state.items().iter().all(|i| i.quantity >= 1));
        }
        assert_eq!(state.total(), Money::from_cents(4 * 1050 + 9999));
    }

    #[test]
    fn test_prescription_item_ids() {
        let state = reduce(
            &CartState::empty(),
            CartAction::AddItem(item("amox", 1200, 1).prescription_only()),
        );
        let state = reduce(&state, CartAction::AddItem(item("vit-c", 500, 1)));
        assert!(state.requires_prescription());
        assert_eq!(state.prescription_item_ids(), vec!["amox".to_string()]);
    }

    #[test]
    fn test_rehydrate_recomputes_total_and_drops_bad_lines() {
        let json = r#"{
            "items": [
                {"id": "a", "name": "A", "price": 10, "quantity": 2},
                {"id": "b", "name": "B", "price": 3.5, "quantity": 0},
                {"id": "a", "name": "A", "price": 10, "quantity": 1}
            ],
            "total": 999
        }"#;
        let state = rehydrate(json);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity, 3);
        assert_eq!(state.total(), Money::from_cents(3000));
    }

    #[test]
    fn test_rehydrate_drops_overflowing_and_negative_lines() {
        let json = r#"{"items":[{"id":"a","name":"A","price":10,"quantity":9223372036854775807}]}"#;
        assert!(rehydrate(json).is_empty());

        let json = r#"{"items": [
            {"id": "neg", "name": "N", "price": -50, "quantity": 1},
            {"id": "ok", "name": "O", "price": 2.5, "quantity": 2}
        ]}"#;
        let state = rehydrate(json);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].id, "ok");
        assert_eq!(state.total(), Money::from_cents(500));
    }

    #[test]
    fn test_rehydrate_malformed_is_empty() {
        assert!(rehydrate("not json").is_empty());
        assert!(rehydrate("[1,2,3]").is_empty());
    }

    #[test]
    fn test_store_persists_and_round_trips() {
        let storage = MemoryStorage::new();
        {
            let mut store = CartStore::open(&storage).unwrap();
            store.add_item(item("a", 1000, 2)).unwrap();
            store.add_item(item("b", 499, 1).prescription_only()).unwrap();
        }

        let persisted = storage.load(CART_STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&persisted).unwrap();
        assert_eq!(json["total"], serde_json::json!(24.99));

        let reopened = CartStore::open(&storage).unwrap();
        assert_eq!(reopened.state().items().len(), 2);
        assert_eq!(reopened.state().total(), Money::from_cents(2499));
        assert!(reopened.state().items()[1].requires_prescription);
    }

    #[test]
    fn test_store_open_with_malformed_value_is_empty() {
        let store = CartStore::open(MemoryStorage::with_value(CART_STORAGE_KEY, "{oops")).unwrap();
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_store_open_propagates_read_failure() {
        let err = CartStore::open(UnreadableStorage).unwrap_err();
        assert!(matches!(err, CoreError::Storage(StorageError::ReadFailed { .. })));
    }

    #[test]
    fn test_store_save_failure_keeps_state() {
        let mut store = CartStore::open(ReadOnlyStorage).unwrap();
        let err = store.add_item(item("a", 1000, 1)).unwrap_err();

        assert!(matches!(err, CoreError::Storage(StorageError::WriteFailed { .. })));
        assert_eq!(store.state().items().len(), 1);
        assert_eq!(store.state().total(), Money::from_cents(1000));
    }
}
