//! # Domain Types
//!
//! Core domain types shared by the cart, checkout and order views.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (product)   │   │  order_id       │   │  id             │       │
//! │  │  price          │   │  status         │   │  order_id       │       │
//! │  │  quantity       │   │  payment_status │   │  payment_url    │       │
//! │  │  requires_rx    │   │  items (frozen) │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderItem     │   │ StockAdjustment │   │    Reminder     │       │
//! │  │  snapshot at    │   │  quantity_change│   │  schedule_time  │       │
//! │  │  placement time │   │  reason         │   │  is_active      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backend Leniency
//! The backend is not strict about id and timestamp encodings: ids arrive as
//! strings or numbers, timestamps as RFC 3339 strings or epoch milliseconds.
//! The helpers at the bottom of this file normalise both.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::lifecycle::{OrderStatus, PaymentStatus};
use crate::money::Money;

// =============================================================================
// Cart Item
// =============================================================================

/// An item in the shopping cart.
///
/// ## Design Notes
/// - `id` is the product id and the cart's identity key
/// - `price` is frozen when the item is added; catalog price changes do not
///   reach items already in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product id (identity within the cart).
    pub id: String,

    /// Display name at time of adding (frozen).
    pub name: String,

    /// Product image, empty when the catalog has none.
    #[serde(default)]
    pub image_url: String,

    /// Unit price at time of adding (frozen).
    pub price: Money,

    /// Quantity in cart (always >= 1 once inside a CartState).
    #[ts(type = "number")]
    pub quantity: i64,

    /// Prescription-only medication.
    #[serde(default)]
    pub requires_prescription: bool,
}

impl CartItem {
    /// Creates a cart item with no image and no prescription requirement.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, quantity: i64) -> Self {
        CartItem {
            id: id.into(),
            name: name.into(),
            image_url: String::new(),
            price,
            quantity,
            requires_prescription: false,
        }
    }

    /// Marks the item as prescription-only.
    pub fn prescription_only(mut self) -> Self {
        self.requires_prescription = true;
        self
    }

    /// Sets the product image.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Calculates the line total (unit price × quantity), or `None` when it
    /// does not fit in the cent range.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul_quantity(self.quantity)
    }

    /// Freezes this cart line into an order line.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.id.clone(),
            product_name: self.name.clone(),
            quantity: self.quantity,
            price: self.price,
        }
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub product_id: String,
    /// Product name at time of placement (frozen).
    pub product_name: String,
    #[ts(type = "number")]
    pub quantity: i64,
    /// Unit price at time of placement (frozen).
    pub price: Money,
}

// =============================================================================
// Order
// =============================================================================

/// A backend-owned order. The client only holds read views of it.
///
/// `status` and `payment_status` are independent axes: an order can be
/// `approved` while its payment is still `payment_pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    #[serde(deserialize_with = "deserialize_id")]
    pub order_id: String,

    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub customer_id: Option<String>,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    #[serde(default)]
    pub subtotal: Money,

    #[serde(default)]
    pub shipping_cost: Money,

    #[ts(type = "string")]
    pub status: OrderStatus,

    /// Absent on the wire means no payment has been recorded yet.
    #[serde(default)]
    #[ts(type = "string")]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub prescription_url: Option<String>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Order total as charged: subtotal plus shipping.
    pub fn total(&self) -> Money {
        self.subtotal + self.shipping_cost
    }
}

/// One page of orders from a listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl OrderPage {
    /// Number of pages for the reported total.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

// =============================================================================
// Payment
// =============================================================================

/// Response of the payment-link endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub payment_url: String,
}

/// A payment record attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub order_id: String,
    pub amount: Money,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Catalog & Inventory
// =============================================================================

/// A catalog product as returned by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub requires_prescription: bool,
}

/// Admin stock change request body.
///
/// The sign of `quantity_change` is interpreted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub quantity_change: i64,
    pub reason: String,
}

/// One entry of a product's inventory history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLog {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub quantity_change: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Reminders
// =============================================================================

/// A medication reminder scheduled by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub schedule_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// One delivery attempt of a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderLog {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub sent_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Lenient Wire Helpers
// =============================================================================

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

/// Accepts `"42"` or `42`.
pub fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(IdVisitor)
}

/// Accepts `"42"`, `42` or `null`.
pub fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Option<DateTime<Utc>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 timestamp or epoch milliseconds")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Utc.timestamp_millis_opt(v)
            .single()
            .map(Some)
            .ok_or_else(|| E::custom(format!("timestamp {} out of range", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("timestamp {} out of range", v)))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_i64(v as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        // Epoch millis sometimes arrive quoted
        if let Ok(millis) = v.parse::<i64>() {
            return self.visit_i64(millis);
        }
        DateTime::parse_from_rfc3339(v)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| E::custom(format!("invalid timestamp '{}': {}", v, e)))
    }
}

/// Accepts RFC 3339 strings, epoch milliseconds (number or string) or `null`.
pub fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    deserializer.deserialize_option(TimestampVisitor)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_line_total() {
        let item = CartItem::new("a", "Aspirin", Money::from_cents(499), 3);
        assert_eq!(item.line_total(), Some(Money::from_cents(1497)));

        let huge = CartItem::new("b", "Bulk", Money::from_cents(1000), 1 << 62);
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_cart_item_defaults_when_fields_missing() {
        let item: CartItem =
            serde_json::from_str(r#"{"id":"a","name":"Aspirin","price":4.99,"quantity":2}"#)
                .unwrap();
        assert_eq!(item.image_url, "");
        assert!(!item.requires_prescription);
        assert_eq!(item.price.cents(), 499);
    }

    #[test]
    fn test_order_item_snapshot_is_independent() {
        let mut item = CartItem::new("a", "Aspirin", Money::from_cents(499), 2);
        let frozen = item.to_order_item();
        item.price = Money::from_cents(999);
        assert_eq!(frozen.price.cents(), 499);
        assert_eq!(frozen.quantity, 2);
    }

    #[test]
    fn test_order_parses_lenient_backend_payload() {
        let json = r#"{
            "order_id": 17,
            "customer_id": "c-9",
            "items": [{"product_id": 3, "product_name": "Ibuprofen", "quantity": 2, "price": 7.5}],
            "subtotal": 15,
            "shipping_cost": 10,
            "status": "payment_pending",
            "created_at": 1700000000000,
            "updated_at": "2024-03-01T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.order_id, "17");
        assert_eq!(order.items[0].product_id, "3");
        assert_eq!(order.status, OrderStatus::PaymentPending);
        assert_eq!(order.payment_status, PaymentStatus::PaymentPending);
        assert_eq!(order.total().cents(), 2500);
        assert_eq!(order.created_at.unwrap().timestamp_millis(), 1_700_000_000_000);
        assert!(order.updated_at.is_some());
        assert!(order.prescription_url.is_none());
    }

    #[test]
    fn test_order_page_total_pages() {
        let page = OrderPage {
            orders: vec![],
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_product_parses_admin_payload() {
        let product: Product = serde_json::from_str(
            r#"{"id": 5, "name": "Amoxicillin", "price": "12.00", "stock": 40, "requires_prescription": true}"#,
        )
        .unwrap();
        assert_eq!(product.id, "5");
        assert!(product.requires_prescription);
        assert_eq!(product.price.cents(), 1200);
        assert_eq!(product.stock, 40);
    }

    #[test]
    fn test_reminder_omits_unset_ids() {
        let reminder = Reminder {
            id: None,
            customer_id: None,
            title: "Take vitamin D".to_string(),
            description: String::new(),
            schedule_time: "08:00".to_string(),
            is_active: true,
        };
        let json = serde_json::to_value(&reminder).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["title"], "Take vitamin D");
    }
}
