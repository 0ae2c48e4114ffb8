//! # Checkout
//!
//! Preconditions for turning the cart into an order. Submission itself
//! lives in `pharma-client`; this module only decides whether the cart may
//! be submitted and freezes what would be sent.
//!
//! ## Gate Order
//! ```text
//! prepare_checkout(cart, credential, prescription)
//!      │
//!      ├── no / blank credential ──────────────► AuthRequired
//!      │
//!      ├── Rx items and no prescription ───────► PrescriptionRequired { ids }
//!      │
//!      ├── empty cart ─────────────────────────► EmptyCart
//!      │
//!      └── OrderIntent { intent_id, items (copied), prescription }
//! ```
//!
//! The first failing gate wins. The live cart is never touched here; it is
//! cleared only after the backend confirms the order.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::cart::CartState;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartItem, OrderItem};
use crate::validation::{content_type_for, validate_prescription};

// =============================================================================
// Prescription
// =============================================================================

/// A prescription file attached to the checkout.
#[derive(Clone, PartialEq, Eq)]
pub struct Prescription {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

impl Prescription {
    /// Accepts a prescription upload after the type and size gate.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let content_type = content_type.into().trim().to_ascii_lowercase();
        validate_prescription(&content_type, data.len())?;
        Ok(Prescription {
            file_name: file_name.into(),
            content_type,
            data,
        })
    }

    /// Like `new`, with the content type taken from the file extension.
    pub fn from_file_name(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let content_type =
            content_type_for(&file_name).ok_or_else(|| ValidationError::InvalidFormat {
                field: "prescription".to_string(),
                reason: format!("unsupported file type: {}", file_name),
            })?;
        Self::new(file_name, content_type, data)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Keeps file bytes out of logs.
impl fmt::Debug for Prescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prescription")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

// =============================================================================
// Order Intent
// =============================================================================

/// A validated, frozen checkout request.
///
/// `items` are copies: later cart edits do not change an intent that is
/// already being submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    /// Client-generated id, sent as the idempotency key.
    pub intent_id: Uuid,
    pub items: Vec<CartItem>,
    pub prescription: Option<Prescription>,
    pub prepared_at: DateTime<Utc>,
}

impl OrderIntent {
    /// Order lines as the backend expects them.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items.iter().map(CartItem::to_order_item).collect()
    }
}

/// Runs the checkout gates and freezes the cart into an `OrderIntent`.
pub fn prepare_checkout(
    cart: &CartState,
    credential: Option<&str>,
    prescription: Option<&Prescription>,
) -> CoreResult<OrderIntent> {
    if credential.map_or(true, |c| c.trim().is_empty()) {
        return Err(CoreError::AuthRequired);
    }

    if cart.requires_prescription() && prescription.is_none() {
        return Err(CoreError::PrescriptionRequired {
            product_ids: cart.prescription_item_ids(),
        });
    }

    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    Ok(OrderIntent {
        intent_id: Uuid::new_v4(),
        items: cart.items().to_vec(),
        prescription: prescription.cloned(),
        prepared_at: Utc::now(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{reduce, CartAction};
    use crate::money::Money;

    fn cart(items: Vec<CartItem>) -> CartState {
        items.into_iter().fold(CartState::empty(), |state, item| {
            reduce(&state, CartAction::AddItem(item))
        })
    }

    fn pdf() -> Prescription {
        Prescription::new("rx.pdf", "application/pdf", vec![0x25, 0x50, 0x44, 0x46]).unwrap()
    }

    #[test]
    fn test_auth_checked_first() {
        let empty = CartState::empty();
        assert!(matches!(
            prepare_checkout(&empty, None, None),
            Err(CoreError::AuthRequired)
        ));
        assert!(matches!(
            prepare_checkout(&empty, Some("   "), None),
            Err(CoreError::AuthRequired)
        ));
    }

    #[test]
    fn test_prescription_gate_then_success() {
        let cart = cart(vec![
            CartItem::new("amox-500", "Amoxicillin", Money::from_cents(1200), 1).prescription_only(),
            CartItem::new("vit-c", "Vitamin C", Money::from_cents(500), 2),
        ]);

        match prepare_checkout(&cart, Some("token"), None) {
            Err(CoreError::PrescriptionRequired { product_ids }) => {
                assert_eq!(product_ids, vec!["amox-500".to_string()]);
            }
            other => panic!("expected PrescriptionRequired, got {:?}", other),
        }

        let rx = pdf();
        let intent = prepare_checkout(&cart, Some("token"), Some(&rx)).unwrap();
        assert_eq!(intent.items.len(), 2);
        assert_eq!(intent.prescription.as_ref().map(|p| p.file_name()), Some("rx.pdf"));
    }

    #[test]
    fn test_empty_cart_rejected_after_auth() {
        assert!(matches!(
            prepare_checkout(&CartState::empty(), Some("token"), None),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_intent_is_a_snapshot() {
        let state = cart(vec![CartItem::new("a", "A", Money::from_cents(1000), 2)]);
        let intent = prepare_checkout(&state, Some("token"), None).unwrap();

        let state = reduce(&state, CartAction::Clear);
        assert!(state.is_empty());
        assert_eq!(intent.items.len(), 1);

        let lines = intent.order_items();
        assert_eq!(lines[0].product_id, "a");
        assert_eq!(lines[0].price, Money::from_cents(1000));
    }

    #[test]
    fn test_intent_ids_are_unique() {
        let state = cart(vec![CartItem::new("a", "A", Money::from_cents(1000), 1)]);
        let first = prepare_checkout(&state, Some("token"), None).unwrap();
        let second = prepare_checkout(&state, Some("token"), None).unwrap();
        assert_ne!(first.intent_id, second.intent_id);
    }

    #[test]
    fn test_prescription_rejects_bad_type() {
        assert!(Prescription::new("rx.gif", "image/gif", vec![1]).is_err());
        assert!(Prescription::from_file_name("rx.txt", vec![1]).is_err());
        let png = Prescription::from_file_name("rx.PNG", vec![1, 2, 3]).unwrap();
        assert_eq!(png.content_type(), "image/png");
    }

    #[test]
    fn test_prescription_debug_hides_bytes() {
        let debug = format!("{:?}", pdf());
        assert!(debug.contains("bytes: 4"));
        assert!(!debug.contains("37"));
    }
}
