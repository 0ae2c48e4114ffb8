//! # Order Lifecycle
//!
//! The order status state machine. Every "may the user do X to this order?"
//! question goes through this module instead of comparing status strings in
//! the UI layer.
//!
//! ## State Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Status Transitions                          │
//! │                                                                         │
//! │   placed ──► payment_pending ──(backend)──► paid / payment_failed      │
//! │                   │                                                     │
//! │                   │ GeneratePaymentUrl (status unchanged,              │
//! │                   │ only while payment_status != complete)             │
//! │                   ▼                                                     │
//! │              payment link                                               │
//! │                                                                         │
//! │   pending / processing ──CustomerCancel──► cancelled                    │
//! │                                                                         │
//! │   any ──AdminSetStatus──► approved | shipped | completed | cancelled    │
//! │                                                                         │
//! │   Terminal: completed, cancelled (no customer actions)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `status` and `payment_status` are separate axes. The backend moves the
//! payment axis; the client only reads it.
//!
//! The backend stays the authority. A transition accepted here can still be
//! refused remotely, and the remote refusal is what the user sees.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Order;

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order as reported by the backend.
///
/// Values the client does not know are kept in `Unknown` so that they
/// round-trip unchanged and offer no actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    PaymentPending,
    PaymentFailed,
    Approved,
    Paid,
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
    Unknown(String),
}

impl OrderStatus {
    /// Wire representation (snake_case).
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::PaymentFailed => "payment_failed",
            OrderStatus::Approved => "approved",
            OrderStatus::Paid => "paid",
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown(raw) => raw,
        }
    }

    /// Completed and cancelled orders accept no further customer actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Customers may cancel only before fulfilment starts.
    pub fn is_customer_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Unknown(_))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "payment_pending" => OrderStatus::PaymentPending,
            "payment_failed" => OrderStatus::PaymentFailed,
            "approved" => OrderStatus::Approved,
            "paid" => OrderStatus::Paid,
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown(s.to_string()),
        })
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Statuses an administrator may set from the back office.
pub const ADMIN_STATUS_OPTIONS: [OrderStatus; 4] = [
    OrderStatus::Approved,
    OrderStatus::Shipped,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

// =============================================================================
// Payment Status
// =============================================================================

/// Payment axis of an order. Only the backend changes it.
///
/// An order with no recorded payment (absent or `null` on the wire) reads
/// as `PaymentPending`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PaymentStatus {
    #[default]
    PaymentPending,
    Complete,
    Failed,
    Unknown(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::PaymentPending => "payment_pending",
            PaymentStatus::Complete => "complete",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PaymentStatus::Complete)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "payment_pending" | "pending" | "" => PaymentStatus::PaymentPending,
            "complete" | "completed" => PaymentStatus::Complete,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Unknown(s),
        }
    }
}

impl From<Option<String>> for PaymentStatus {
    fn from(s: Option<String>) -> Self {
        s.map(PaymentStatus::from).unwrap_or_default()
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

// =============================================================================
// Events & Actions
// =============================================================================

/// Who is looking at the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer,
    Admin,
}

/// Something a user asks to do to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    /// Request a payment link. Does not change status.
    GeneratePaymentUrl,
    /// Customer-initiated cancellation.
    CustomerCancel,
    /// Back-office status change.
    AdminSetStatus(OrderStatus),
}

/// An action a UI may offer for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderAction {
    PayNow,
    Cancel,
    SetStatus(OrderStatus),
}

// =============================================================================
// Transitions
// =============================================================================

/// Whether a payment link may be requested.
///
/// True only while the order waits for payment and no payment completed.
pub fn can_generate_payment_url(status: &OrderStatus, payment_status: &PaymentStatus) -> bool {
    *status == OrderStatus::PaymentPending && !payment_status.is_complete()
}

/// Applies `event` to `order` and returns the status the order would have
/// afterwards. Nothing is mutated; the caller sends the request and adopts
/// whatever the backend answers.
///
/// ## Example
/// ```text
/// (payment_pending, payment_pending) + GeneratePaymentUrl → Ok(payment_pending)
/// (shipped, complete)                + GeneratePaymentUrl → PaymentNotApplicable
/// (processing, _)                    + CustomerCancel     → Ok(cancelled)
/// (approved, _)                      + AdminSetStatus(shipped) → Ok(shipped)
/// (approved, _)                      + AdminSetStatus(paid)    → Validation(NotAllowed)
/// ```
pub fn transition(order: &Order, event: &OrderEvent) -> CoreResult<OrderStatus> {
    match event {
        OrderEvent::GeneratePaymentUrl => {
            ensure_payment_applicable(order)?;
            Ok(order.status.clone())
        }
        OrderEvent::CustomerCancel => {
            if order.status.is_customer_cancellable() {
                Ok(OrderStatus::Cancelled)
            } else {
                Err(CoreError::CancellationNotAllowed {
                    order_id: order.order_id.clone(),
                    status: order.status.clone(),
                })
            }
        }
        OrderEvent::AdminSetStatus(target) => {
            if !ADMIN_STATUS_OPTIONS.contains(target) {
                return Err(ValidationError::NotAllowed {
                    field: "status".to_string(),
                    allowed: ADMIN_STATUS_OPTIONS
                        .iter()
                        .map(|s| s.as_str().to_string())
                        .collect(),
                }
                .into());
            }
            Ok(target.clone())
        }
    }
}

/// Fails with `PaymentNotApplicable` unless a payment link may be requested.
pub fn ensure_payment_applicable(order: &Order) -> CoreResult<()> {
    if can_generate_payment_url(&order.status, &order.payment_status) {
        Ok(())
    } else {
        Err(CoreError::PaymentNotApplicable {
            order_id: order.order_id.clone(),
            status: order.status.clone(),
            payment_status: order.payment_status.clone(),
        })
    }
}

/// Lists the actions a UI may offer `actor` for `order`.
///
/// Orders in a status the client does not recognise offer nothing.
pub fn available_actions(order: &Order, actor: Actor) -> Vec<OrderAction> {
    if !order.status.is_known() {
        return Vec::new();
    }

    match actor {
        Actor::Customer => {
            let mut actions = Vec::new();
            if can_generate_payment_url(&order.status, &order.payment_status) {
                actions.push(OrderAction::PayNow);
            }
            if order.status.is_customer_cancellable() {
                actions.push(OrderAction::Cancel);
            }
            actions
        }
        Actor::Admin => ADMIN_STATUS_OPTIONS
            .iter()
            .filter(|target| **target != order.status)
            .cloned()
            .map(OrderAction::SetStatus)
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
