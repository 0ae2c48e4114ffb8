//! # Error Types
//!
//! Domain-specific error types for pharma-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharma-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations (checkout, lifecycle) │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StorageError     - Persistence port failures                      │
//! │                                                                         │
//! │  pharma-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport, backend rejection, config           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the user sees ({ code, message })         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CliError → User     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ids, order ids, statuses)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::lifecycle::{OrderStatus, PaymentStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised locally by the cart, pricing, checkout and lifecycle modules before
/// anything is sent to the backend.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted without a bearer credential.
    #[error("Please log in to complete your order")]
    AuthRequired,

    /// Prescription-only items in the cart and no prescription attached.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: [Amoxicillin (Rx), Vitamin C]
    ///      │
    ///      ▼
    /// prepare_checkout(prescription: None)
    ///      │
    ///      ▼
    /// PrescriptionRequired { product_ids: ["amoxicillin-500"] }
    ///      │
    ///      ▼
    /// UI asks for an upload, user retries with the file attached
    /// ```
    #[error("A valid prescription is required for: {}", product_ids.join(", "))]
    PrescriptionRequired { product_ids: Vec<String> },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Promo code not on the allowlist.
    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    /// Payment link requested for an order that cannot take a payment.
    #[error("Payment not applicable for order {order_id} (status {status}, payment {payment_status})")]
    PaymentNotApplicable {
        order_id: String,
        status: OrderStatus,
        payment_status: PaymentStatus,
    },

    /// Customer cancellation requested outside the cancellable window.
    #[error("Order {order_id} is {status} and can no longer be cancelled")]
    CancellationNotAllowed { order_id: String, status: OrderStatus },

    /// The persistence port failed to read or write the cart.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., unparsable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// File exceeds the size limit.
    #[error("{field} must be at most {max_bytes} bytes (got {actual_bytes})")]
    TooLarge {
        field: String,
        max_bytes: usize,
        actual_bytes: usize,
    },
}

// =============================================================================
// Storage Error
// =============================================================================

/// Failures reported by a `CartStorage` implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading the persisted value failed.
    #[error("failed to read '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    /// Writing the persisted value failed.
    #[error("failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
