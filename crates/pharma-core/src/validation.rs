//! # Validation Module
//!
//! Input checks that run before a cart mutation or backend request.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend / CLI argument parsing                              │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, prices, promo code shape                              │
//! │  ├── Prescription file type and size                                   │
//! │  └── Stock adjustment requests                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Final authority; its refusal is shown verbatim                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CartItem, StockAdjustment};
use crate::MAX_PRESCRIPTION_BYTES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Content types accepted for prescription uploads.
pub const ALLOWED_PRESCRIPTION_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity entered by the user.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Zero is not an error for `update_quantity` (it removes the line); callers
/// use this only where a positive amount is required, e.g. "add to cart".
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free samples)
///
/// ## Example
/// ```rust
/// use pharma_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a line before it enters the cart: positive quantity and a
/// non-negative unit price.
pub fn validate_cart_item(item: &CartItem) -> ValidationResult<()> {
    validate_quantity(item.quantity)?;
    validate_price_cents(item.price.cents())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the shape of a promo code. Whether the code is accepted is the
/// pricing policy's decision.
///
/// Returns the trimmed code.
pub fn validate_promo_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();
    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "promo_code".to_string(),
            max: 32,
        });
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "promo_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }
    Ok(code.to_string())
}

// =============================================================================
// Prescription Validators
// =============================================================================

/// Validates a prescription upload.
///
/// ## Rules
/// - Content type must be PDF, JPEG or PNG
/// - Size must not exceed 5 MiB
/// - Must not be empty
///
/// This is a type and size gate. The file content is not inspected.
pub fn validate_prescription(content_type: &str, size_bytes: usize) -> ValidationResult<()> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if !ALLOWED_PRESCRIPTION_TYPES.contains(&content_type.as_str()) {
        return Err(ValidationError::NotAllowed {
            field: "prescription".to_string(),
            allowed: ALLOWED_PRESCRIPTION_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        });
    }

    if size_bytes == 0 {
        return Err(ValidationError::Required {
            field: "prescription".to_string(),
        });
    }

    if size_bytes > MAX_PRESCRIPTION_BYTES {
        return Err(ValidationError::TooLarge {
            field: "prescription".to_string(),
            max_bytes: MAX_PRESCRIPTION_BYTES,
            actual_bytes: size_bytes,
        });
    }

    Ok(())
}

/// Guesses a prescription content type from a file name.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

// =============================================================================
// Inventory Validators
// =============================================================================

/// Validates an admin stock adjustment.
///
/// ## Rules
/// - `quantity_change` must not be zero
/// - `reason` is required
///
/// The sign convention of `quantity_change` belongs to the backend and is
/// not checked here.
pub fn validate_stock_adjustment(adjustment: &StockAdjustment) -> ValidationResult<()> {
    if adjustment.quantity_change == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "quantity_change".to_string(),
        });
    }

    let reason = adjustment.reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }
    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(250).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_promo_code() {
        assert_eq!(validate_promo_code("  discount10 ").unwrap(), "discount10");
        assert!(validate_promo_code("").is_ok());
        assert!(validate_promo_code("no spaces").is_err());
        assert!(validate_promo_code(&"A".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_prescription() {
        assert!(validate_prescription("application/pdf", 1024).is_ok());
        assert!(validate_prescription("IMAGE/PNG", 1024).is_ok());
        assert!(validate_prescription("image/jpeg", MAX_PRESCRIPTION_BYTES).is_ok());

        assert!(matches!(
            validate_prescription("image/gif", 1024),
            Err(ValidationError::NotAllowed { .. })
        ));
        assert!(matches!(
            validate_prescription("image/png", MAX_PRESCRIPTION_BYTES + 1),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(validate_prescription("image/png", 0).is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("scan.PDF"), Some("application/pdf"));
        assert_eq!(content_type_for("photo.jpg"), Some("image/jpeg"));
        assert_eq!(content_type_for("rx.png"), Some("image/png"));
        assert_eq!(content_type_for("notes.txt"), None);
        assert_eq!(content_type_for("noextension"), None);
    }

    #[test]
    fn test_validate_stock_adjustment() {
        let ok = StockAdjustment {
            quantity_change: -5,
            reason: "Damaged in transit".to_string(),
        };
        assert!(validate_stock_adjustment(&ok).is_ok());

        let zero = StockAdjustment {
            quantity_change: 0,
            reason: "noop".to_string(),
        };
        assert!(matches!(
            validate_stock_adjustment(&zero),
            Err(ValidationError::MustBeNonZero { .. })
        ));

        let no_reason = StockAdjustment {
            quantity_change: 10,
            reason: "  ".to_string(),
        };
        assert!(matches!(
            validate_stock_adjustment(&no_reason),
            Err(ValidationError::Required { .. })
        ));
    }
}
