//! # Cart Commands
//!
//! Cart manipulation. Every change is written to disk before the command
//! returns, so the next invocation sees the same cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │          │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   cart add                         cart emptied         │
//! │                   cart update                      (orders.rs)          │
//! │                   cart remove                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   cart clear ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharma_client::Storefront;
use pharma_core::{
    compute_totals, CartItem, CartStorage, Money, PriceBreakdown, PromoOutcome,
};
use serde::Serialize;
use tracing::debug;

use crate::error::CliResult;

/// Cart contents with checkout figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub requires_prescription: bool,
    pub totals: PriceBreakdown,
    pub promo: PromoOutcome,
}

impl CartResponse {
    /// Builds the response, pricing the cart with `promo` if given.
    ///
    /// An unknown promo code does not fail the command; it shows up as
    /// `promo.kind = "rejected"` with no discount.
    pub fn build<S: CartStorage>(shop: &Storefront<S>, promo: Option<&str>) -> Self {
        let cart = shop.cart();
        let outcome = compute_totals(cart, promo, shop.policy());
        CartResponse {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            requires_prescription: cart.requires_prescription(),
            totals: outcome.totals,
            promo: outcome.promo,
        }
    }
}

/// What `cart add` puts in the cart.
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub requires_prescription: bool,
    pub image_url: Option<String>,
}

impl NewLine {
    fn into_item(self) -> CartItem {
        let mut item = CartItem::new(self.product_id, self.name, self.price, self.quantity);
        if self.requires_prescription {
            item = item.prescription_only();
        }
        if let Some(url) = self.image_url {
            item = item.with_image(url);
        }
        item
    }
}

/// Shows the cart.
pub fn show<S: CartStorage>(shop: &Storefront<S>, promo: Option<&str>) -> CartResponse {
    debug!(promo = ?promo, "cart show");
    CartResponse::build(shop, promo)
}

/// Adds a product, merging with an existing line of the same id.
///
/// ## Rules
/// - Quantity below 1 leaves the cart unchanged
/// - Adding an id already in the cart sums the quantities
pub fn add<S: CartStorage>(shop: &mut Storefront<S>, line: NewLine) -> CliResult<CartResponse> {
    shop.add_to_cart(line.into_item())?;
    Ok(CartResponse::build(shop, None))
}

/// Sets a line's quantity. Zero or less removes the line.
pub fn update<S: CartStorage>(
    shop: &mut Storefront<S>,
    product_id: &str,
    quantity: i64,
) -> CliResult<CartResponse> {
    shop.update_quantity(product_id, quantity)?;
    Ok(CartResponse::build(shop, None))
}

pub fn remove<S: CartStorage>(shop: &mut Storefront<S>, product_id: &str) -> CliResult<CartResponse> {
    shop.remove_from_cart(product_id)?;
    Ok(CartResponse::build(shop, None))
}

pub fn clear<S: CartStorage>(shop: &mut Storefront<S>) -> CliResult<CartResponse> {
    shop.clear_cart()?;
    Ok(CartResponse::build(shop, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pharma_client::{BackendClient, BackendSettings};
    use pharma_core::{CartStore, MemoryStorage, PricingPolicy};

    fn shop() -> Storefront<MemoryStorage> {
        let client = BackendClient::new(&BackendSettings::default()).unwrap();
        let cart = CartStore::open(MemoryStorage::new()).unwrap();
        Storefront::new(client, cart, PricingPolicy::default())
    }

    fn line(id: &str, price: i64, quantity: i64) -> NewLine {
        NewLine {
            product_id: id.to_string(),
            name: id.to_uppercase(),
            price: Money::from_cents(price),
            quantity,
            requires_prescription: false,
            image_url: None,
        }
    }

    #[test]
    fn test_add_merges_quantities() {
        let mut shop = shop();
        add(&mut shop, line("a", 1000, 2)).unwrap();
        let response = add(&mut shop, line("a", 1000, 3)).unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].quantity, 5);
        assert_eq!(response.totals.subtotal, Money::from_cents(5000));
    }

    #[test]
    fn test_add_refuses_invalid_line() {
        let mut shop = shop();
        add(&mut shop, line("a", 1000, 1)).unwrap();

        let err = add(&mut shop, line("neg", -5000, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = add(&mut shop, line("b", 500, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let response = show(&shop, None);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.totals.subtotal, Money::from_cents(1000));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let mut shop = shop();
        add(&mut shop, line("a", 1000, 2)).unwrap();
        add(&mut shop, line("b", 500, 1)).unwrap();

        let response = update(&mut shop, "a", 0).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id, "b");
    }

    #[test]
    fn test_shipping_boundary() {
        let mut shop = shop();
        let at_threshold = add(&mut shop, line("a", 10_000, 1)).unwrap();
        assert_eq!(at_threshold.totals.shipping, Money::from_cents(1000));

        clear(&mut shop).unwrap();
        let above = add(&mut shop, line("a", 10_001, 1)).unwrap();
        assert!(above.totals.shipping.is_zero());
    }

    #[test]
    fn test_show_with_rejected_promo() {
        let mut shop = shop();
        add(&mut shop, line("a", 5000, 1)).unwrap();

        let applied = show(&shop, Some("DISCOUNT10"));
        assert_eq!(applied.totals.discount, Money::from_cents(500));

        let rejected = show(&shop, Some("BOGUS"));
        assert!(rejected.totals.discount.is_zero());
        assert!(matches!(rejected.promo, PromoOutcome::Rejected { .. }));
    }

    #[test]
    fn test_prescription_flag_reported() {
        let mut shop = shop();
        let mut rx = line("amox-500", 1500, 1);
        rx.requires_prescription = true;

        assert!(add(&mut shop, rx).unwrap().requires_prescription);
        assert!(!remove(&mut shop, "amox-500").unwrap().requires_prescription);
    }
}
