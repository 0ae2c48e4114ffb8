//! # Pricing Engine
//!
//! Turns a cart snapshot into the figures shown at checkout.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal = Σ price × quantity                                          │
//! │  shipping = 0            if subtotal > free_shipping_threshold          │
//! │           = shipping_fee otherwise                                      │
//! │  discount = subtotal × promo rate (half-up to the cent), or 0           │
//! │  total    = subtotal - discount + shipping                              │
//! │                                                                         │
//! │  Example (default policy):                                              │
//! │    subtotal  $50.00, code "discount10"                                  │
//! │    shipping  $10.00 (50.00 is not above 100.00)                         │
//! │    discount   $5.00                                                     │
//! │    total     $55.00                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The threshold is strict: a subtotal of exactly $100.00 still pays
//! shipping. The shipping decision uses the subtotal before discount.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartState;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::{DEFAULT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD};

// =============================================================================
// Policy
// =============================================================================

/// A promo code on the allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Matched case-insensitively against user input with surrounding
    /// whitespace removed.
    pub code: String,
    /// Discount rate in basis points (1000 = 10%).
    pub rate_bps: u32,
}

impl PromoCode {
    pub fn new(code: impl Into<String>, rate_bps: u32) -> Self {
        PromoCode {
            code: code.into(),
            rate_bps,
        }
    }

    fn matches(&self, input: &str) -> bool {
        self.code.eq_ignore_ascii_case(input.trim())
    }
}

/// Shipping and promo rules. Missing fields take the default policy's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Money,
    /// Flat fee charged otherwise.
    pub shipping_fee: Money,
    /// Accepted promo codes.
    pub promo_codes: Vec<PromoCode>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            free_shipping_threshold: Money::from_cents(FREE_SHIPPING_THRESHOLD),
            shipping_fee: Money::from_cents(DEFAULT_SHIPPING_FEE),
            promo_codes: vec![PromoCode::new("DISCOUNT10", 1000)],
        }
    }
}

impl PricingPolicy {
    /// Shipping owed for `subtotal`.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.shipping_fee
        }
    }

    /// Looks up a promo code. Blank input means "no code" and yields
    /// `Ok(None)`; anything else must be on the allowlist.
    pub fn validate_promo(&self, input: &str) -> CoreResult<Option<&PromoCode>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        self.promo_codes
            .iter()
            .find(|p| p.matches(input))
            .map(Some)
            .ok_or_else(|| CoreError::InvalidPromoCode(input.to_string()))
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Checkout figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub total: Money,
}

/// What happened to the promo code the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromoOutcome {
    /// No code entered.
    None,
    /// Code accepted.
    Applied { code: String, rate_bps: u32 },
    /// Code not on the allowlist; no discount given.
    Rejected { code: String },
}

/// Figures plus promo feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingOutcome {
    pub totals: PriceBreakdown,
    pub promo: PromoOutcome,
}

/// Computes checkout totals for `cart`.
///
/// An unknown promo code never fails the calculation; it produces a zero
/// discount and `PromoOutcome::Rejected` so the UI can say so.
pub fn compute_totals(
    cart: &CartState,
    promo_code: Option<&str>,
    policy: &PricingPolicy,
) -> PricingOutcome {
    let subtotal = cart.total();
    let shipping = policy.shipping_for(subtotal);

    let (discount, promo) = match promo_code.map(|c| policy.validate_promo(c)) {
        None | Some(Ok(None)) => (Money::zero(), PromoOutcome::None),
        Some(Ok(Some(promo))) => (
            subtotal.percentage(promo.rate_bps),
            PromoOutcome::Applied {
                code: promo.code.clone(),
                rate_bps: promo.rate_bps,
            },
        ),
        Some(Err(_)) => (
            Money::zero(),
            PromoOutcome::Rejected {
                code: promo_code.unwrap_or_default().trim().to_string(),
            },
        ),
    };

    PricingOutcome {
        totals: PriceBreakdown {
            subtotal,
            discount,
            shipping,
            total: subtotal - discount + shipping,
        },
        promo,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{reduce, CartAction};
    use crate::types::CartItem;

    fn cart_of(cents: i64) -> CartState {
        reduce(
            &CartState::empty(),
            CartAction::AddItem(CartItem::new("x", "X", Money::from_cents(cents), 1)),
        )
    }

    #[test]
    fn test_free_shipping_boundary() {
        let policy = PricingPolicy::default();

        let at = compute_totals(&cart_of(10_000), None, &policy);
        assert_eq!(at.totals.shipping, Money::from_cents(1000));
        assert_eq!(at.totals.total, Money::from_cents(11_000));

        let above = compute_totals(&cart_of(10_001), None, &policy);
        assert!(above.totals.shipping.is_zero());
        assert_eq!(above.totals.total, Money::from_cents(10_001));
    }

    #[test]
    fn test_promo_applied_case_insensitive() {
        let policy = PricingPolicy::default();
        let outcome = compute_totals(&cart_of(5000), Some("discount10"), &policy);

        assert_eq!(outcome.totals.discount, Money::from_cents(500));
        assert_eq!(outcome.totals.total, Money::from_cents(5500));
        assert_eq!(
            outcome.promo,
            PromoOutcome::Applied {
                code: "DISCOUNT10".to_string(),
                rate_bps: 1000
            }
        );
    }

    #[test]
    fn test_invalid_promo_gives_no_discount() {
        let policy = PricingPolicy::default();
        let outcome = compute_totals(&cart_of(5000), Some("SAVE50"), &policy);

        assert!(outcome.totals.discount.is_zero());
        assert_eq!(
            outcome.promo,
            PromoOutcome::Rejected {
                code: "SAVE50".to_string()
            }
        );
        assert!(matches!(
            policy.validate_promo("SAVE50"),
            Err(CoreError::InvalidPromoCode(code)) if code == "SAVE50"
        ));
    }

    #[test]
    fn test_blank_promo_means_none() {
        let policy = PricingPolicy::default();
        let outcome = compute_totals(&cart_of(5000), Some("   "), &policy);
        assert_eq!(outcome.promo, PromoOutcome::None);
        assert!(policy.validate_promo("").unwrap().is_none());
    }

    #[test]
    fn test_promo_input_is_trimmed() {
        let policy = PricingPolicy::default();
        let outcome = compute_totals(&cart_of(5000), Some(" discount10 "), &policy);
        assert_eq!(outcome.totals.discount, Money::from_cents(500));
        assert!(policy.validate_promo("\tDISCOUNT10\n").unwrap().is_some());

        // Inner characters still have to match exactly
        assert!(policy.validate_promo("DISCOUNT 10").is_err());
    }

    #[test]
    fn test_discount_rounds_half_up() {
        let policy = PricingPolicy::default();
        // 10% of $0.05 is half a cent
        let outcome = compute_totals(&cart_of(5), Some("DISCOUNT10"), &policy);
        assert_eq!(outcome.totals.discount, Money::from_cents(1));
    }

    #[test]
    fn test_empty_cart_still_pays_shipping() {
        let outcome = compute_totals(&CartState::empty(), None, &PricingPolicy::default());
        assert!(outcome.totals.subtotal.is_zero());
        assert_eq!(outcome.totals.total, Money::from_cents(1000));
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            free_shipping_threshold: Money::from_cents(2000),
            shipping_fee: Money::from_cents(499),
            promo_codes: vec![],
        };
        let outcome = compute_totals(&cart_of(1500), Some("DISCOUNT10"), &policy);
        assert_eq!(outcome.totals.shipping, Money::from_cents(499));
        assert!(matches!(outcome.promo, PromoOutcome::Rejected { .. }));
    }
}
