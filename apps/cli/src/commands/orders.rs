//! # Order Commands
//!
//! Checkout, order history and payment links for the signed-in customer.
//!
//! ## Checkout Flow
//! ```text
//! pharma checkout --prescription rx.pdf --promo DISCOUNT10
//!      │
//!      ├── signed in? ──► AUTH_REQUIRED before any file is touched
//!      ├── read rx.pdf ──► Prescription (size checked before reading, then type)
//!      ├── apply promo (unknown code: warned, no discount)
//!      ├── Storefront::place_order()
//!      │      AUTH_REQUIRED / PRESCRIPTION_REQUIRED / EMPTY_CART
//!      │      backend refusal ──► its message, cart kept
//!      └── Order ──► cart emptied on disk
//! ```

use std::path::Path;

use pharma_client::{ClientError, OrderQuery, Storefront};
use pharma_core::lifecycle::available_actions;
use pharma_core::{
    Actor, CartStorage, CoreError, Money, Order, OrderAction, OrderPage, Payment,
    PriceBreakdown, Prescription, PromoOutcome, ValidationError, MAX_PRESCRIPTION_BYTES,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

pub const PLACE_ORDER_FALLBACK: &str = "Failed to place order.";
pub const PAYMENT_URL_FALLBACK: &str = "Failed to generate payment URL.";
pub const LOAD_ORDER_FALLBACK: &str = "Failed to load order.";

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    /// Figures as quoted just before submission.
    pub quoted: PriceBreakdown,
    pub promo: PromoOutcome,
}

/// An order with the actions the customer may take on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order: Order,
    pub total: Money,
    pub actions: Vec<String>,
}

impl OrderView {
    pub fn new(order: Order, actor: Actor) -> Self {
        let actions = available_actions(&order, actor)
            .iter()
            .map(action_name)
            .collect();
        OrderView {
            total: order.total(),
            order,
            actions,
        }
    }
}

/// Name an action is shown under.
pub fn action_name(action: &OrderAction) -> String {
    match action {
        OrderAction::PayNow => "pay_now".to_string(),
        OrderAction::Cancel => "cancel".to_string(),
        OrderAction::SetStatus(status) => format!("set_status:{}", status),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlResponse {
    pub order_id: String,
    pub payment_url: String,
}

// =============================================================================
// Commands
// =============================================================================

/// Reads a prescription file from disk.
pub fn read_prescription(path: &Path) -> CliResult<Prescription> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::validation(format!("Not a file: {}", path.display())))?;
    let unreadable = |e: std::io::Error| {
        CliError::validation(format!("Cannot read prescription {}: {}", path.display(), e))
    };

    let size = std::fs::metadata(path).map_err(unreadable)?.len();
    if size > MAX_PRESCRIPTION_BYTES as u64 {
        return Err(ValidationError::TooLarge {
            field: "prescription".to_string(),
            max_bytes: MAX_PRESCRIPTION_BYTES,
            actual_bytes: usize::try_from(size).unwrap_or(usize::MAX),
        }
        .into());
    }

    let data = std::fs::read(path).map_err(unreadable)?;
    Ok(Prescription::from_file_name(file_name, data)?)
}

/// Submits the cart as an order.
pub async fn checkout<S: CartStorage>(
    shop: &mut Storefront<S>,
    prescription: Option<&Path>,
    promo: Option<&str>,
) -> CliResult<CheckoutResponse> {
    if !shop.is_signed_in() {
        return Err(CoreError::AuthRequired.into());
    }

    if let Some(path) = prescription {
        shop.attach_prescription(read_prescription(path)?);
    }

    let mut promo_outcome = PromoOutcome::None;
    if let Some(code) = promo {
        match shop.apply_promo(code) {
            Ok(outcome) => promo_outcome = outcome.promo,
            Err(ClientError::Core(CoreError::InvalidPromoCode(code))) => {
                warn!(code = %code, "Promo code rejected; ordering without discount");
                promo_outcome = PromoOutcome::Rejected { code };
            }
            Err(e) => return Err(e.into()),
        }
    }

    let quoted = shop.totals().totals;
    debug!(total = %quoted.total, "Checking out");

    let order = shop
        .place_order()
        .await
        .map_err(|e| CliError::from_client(e, PLACE_ORDER_FALLBACK))?;
    info!(order_id = %order.order_id, "Order placed");

    Ok(CheckoutResponse {
        order,
        quoted,
        promo: promo_outcome,
    })
}

pub async fn list<S: CartStorage>(shop: &Storefront<S>, query: &OrderQuery) -> CliResult<OrderPage> {
    shop.orders(query)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load orders."))
}

pub async fn show<S: CartStorage>(shop: &Storefront<S>, order_id: &str) -> CliResult<OrderView> {
    let order = shop
        .order(order_id)
        .await
        .map_err(|e| CliError::from_client(e, LOAD_ORDER_FALLBACK))?;
    Ok(OrderView::new(order, Actor::Customer))
}

/// Requests a payment link for an order awaiting payment.
pub async fn pay<S: CartStorage>(shop: &Storefront<S>, order_id: &str) -> CliResult<PaymentUrlResponse> {
    let order = shop
        .order(order_id)
        .await
        .map_err(|e| CliError::from_client(e, LOAD_ORDER_FALLBACK))?;

    let payment_url = shop
        .payment_url(&order)
        .await
        .map_err(|e| CliError::from_client(e, PAYMENT_URL_FALLBACK))?;

    Ok(PaymentUrlResponse {
        order_id: order.order_id,
        payment_url,
    })
}

pub async fn payment<S: CartStorage>(shop: &Storefront<S>, order_id: &str) -> CliResult<Payment> {
    shop.payment_for_order(order_id)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load payment."))
}
