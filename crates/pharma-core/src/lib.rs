//! # pharma-core: Pure Business Logic for PharmaCart
//!
//! The cart, pricing, checkout and order-lifecycle rules of the PharmaCart
//! storefront, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaCart Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pharma-cli / frontend                        │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Orders ──► Admin           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pharma-client (async I/O)                       │   │
//! │  │    Storefront, Admin, BackendClient, FileStorage, config        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pharma-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────────┐           │   │
//! │  │   │  cart   │ │ pricing │ │ checkout │ │ lifecycle │           │   │
//! │  │   │ reducer │ │ totals  │ │  gates   │ │    FSM    │           │   │
//! │  │   │  store  │ │  promo  │ │  intent  │ │  actions  │           │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └───────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • STORAGE BEHIND A TRAIT                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Domain types (CartItem, Order, Payment, Reminder, ...)
//! - [`cart`] - Cart reducer and `CartStore`
//! - [`storage`] - `CartStorage` port and the in-memory implementation
//! - [`pricing`] - Subtotal, shipping, promo discount
//! - [`checkout`] - Checkout gates and `OrderIntent`
//! - [`lifecycle`] - Order status state machine
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pharma_core::cart::CartStore;
//! use pharma_core::pricing::{compute_totals, PricingPolicy};
//! use pharma_core::storage::MemoryStorage;
//! use pharma_core::{CartItem, Money};
//!
//! let mut cart = CartStore::open(MemoryStorage::new()).unwrap();
//! cart.add_item(CartItem::new("vit-c", "Vitamin C", Money::from_cents(2500), 2)).unwrap();
//!
//! let outcome = compute_totals(cart.state(), Some("discount10"), &PricingPolicy::default());
//! assert_eq!(outcome.totals.discount.cents(), 500);
//! assert_eq!(outcome.totals.total.cents(), 5500); // 50.00 - 5.00 + 10.00 shipping
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartAction, CartState, CartStore};
pub use checkout::{prepare_checkout, OrderIntent, Prescription};
pub use error::{CoreError, CoreResult, StorageError, ValidationError};
pub use lifecycle::{Actor, OrderAction, OrderEvent, OrderStatus, PaymentStatus};
pub use money::Money;
pub use pricing::{compute_totals, PriceBreakdown, PricingOutcome, PricingPolicy, PromoOutcome};
pub use storage::{CartStorage, MemoryStorage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat shipping fee in cents ($10.00).
pub const DEFAULT_SHIPPING_FEE: i64 = 1000;

/// Subtotals strictly above this ship free, in cents ($100.00).
pub const FREE_SHIPPING_THRESHOLD: i64 = 10_000;

/// Largest prescription upload accepted (5 MiB).
pub const MAX_PRESCRIPTION_BYTES: usize = 5 * 1024 * 1024;
