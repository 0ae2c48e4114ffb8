//! # Storefront
//!
//! Customer-side session: the cart, the attached prescription, the promo
//! code, and every backend call a shopper can trigger.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          place_order()                                  │
//! │                                                                         │
//! │  ActionGuard("place_order") ── already running? ──► RequestInFlight     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prepare_checkout(cart, credential, prescription)                       │
//! │       │   AuthRequired / PrescriptionRequired / EmptyCart               │
//! │       ▼                                                                 │
//! │  POST /orders (multipart, X-Request-Id = intent id)                     │
//! │       │                                                                 │
//! │       ├── rejected / network error ──► cart untouched, error returned   │
//! │       │                                                                 │
//! │       └── Order ──► cart.clear(), prescription and promo dropped        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharma_core::lifecycle::ensure_payment_applicable;
use pharma_core::pricing::compute_totals;
use pharma_core::validation::{validate_cart_item, validate_promo_code};
use pharma_core::{
    prepare_checkout, CartItem, CartState, CartStorage, CartStore, CoreError, Order, OrderPage,
    Payment, Prescription, PricingOutcome, PricingPolicy, Reminder, ReminderLog,
};
use tracing::{debug, info, warn};

use crate::api::OrderQuery;
use crate::error::ClientResult;
use crate::http::{BackendClient, Credential};
use crate::request::{ActionGuard, RequestScope};

/// A shopper's session against the backend.
pub struct Storefront<S: CartStorage> {
    client: BackendClient,
    cart: CartStore<S>,
    policy: PricingPolicy,
    prescription: Option<Prescription>,
    promo_code: Option<String>,
    guard: ActionGuard,
    scope: RequestScope,
}

impl<S: CartStorage> Storefront<S> {
    pub fn new(client: BackendClient, cart: CartStore<S>, policy: PricingPolicy) -> Self {
        Storefront {
            client,
            cart,
            policy,
            prescription: None,
            promo_code: None,
            guard: ActionGuard::new(),
            scope: RequestScope::new(),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn sign_in(&mut self, credential: Credential) {
        self.client.set_credential(Some(credential));
    }

    pub fn sign_out(&mut self) {
        self.client.set_credential(None);
    }

    pub fn is_signed_in(&self) -> bool {
        self.client.credential().is_some()
    }

    /// Scope whose cancellation drops every pending storefront response.
    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub fn guard(&self) -> &ActionGuard {
        &self.guard
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn cart(&self) -> &CartState {
        self.cart.state()
    }

    /// Adds `item`, merging with an existing line of the same product.
    ///
    /// A non-positive quantity or a negative price is refused with a
    /// validation error and the cart is left alone.
    pub fn add_to_cart(&mut self, item: CartItem) -> ClientResult<&CartState> {
        debug!(product_id = %item.id, quantity = item.quantity, "add_to_cart");
        validate_cart_item(&item).map_err(CoreError::from)?;
        Ok(self.cart.add_item(item)?)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> ClientResult<&CartState> {
        debug!(product_id, "remove_from_cart");
        Ok(self.cart.remove_item(product_id)?)
    }

    /// Sets a line's quantity; zero or less removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> ClientResult<&CartState> {
        debug!(product_id, quantity, "update_quantity");
        Ok(self.cart.update_quantity(product_id, quantity)?)
    }

    pub fn clear_cart(&mut self) -> ClientResult<&CartState> {
        debug!("clear_cart");
        Ok(self.cart.clear()?)
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Applies a promo code. Unknown codes are refused and the previous code
    /// (if any) is dropped; a blank code removes the promo.
    pub fn apply_promo(&mut self, code: &str) -> ClientResult<PricingOutcome> {
        let code = validate_promo_code(code).map_err(CoreError::from)?;

        match self.policy.validate_promo(&code) {
            Ok(_) => {
                self.promo_code = (!code.is_empty()).then_some(code);
                Ok(self.totals())
            }
            Err(e) => {
                self.promo_code = None;
                Err(e.into())
            }
        }
    }

    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Current checkout figures.
    pub fn totals(&self) -> PricingOutcome {
        compute_totals(self.cart.state(), self.promo_code.as_deref(), &self.policy)
    }

    // =========================================================================
    // Prescription
    // =========================================================================

    pub fn attach_prescription(&mut self, prescription: Prescription) {
        info!(
            file_name = prescription.file_name(),
            bytes = prescription.len(),
            "Prescription attached"
        );
        self.prescription = Some(prescription);
    }

    pub fn prescription(&self) -> Option<&Prescription> {
        self.prescription.as_ref()
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submits the cart as an order.
    ///
    /// The cart is cleared only after the backend confirms. A failure to
    /// persist the cleared cart is logged and does not fail the order.
    pub async fn place_order(&mut self) -> ClientResult<Order> {
        let _permit = self.guard.try_begin("place_order")?;

        let credential = self.client.credential().map(Credential::expose);
        let intent = prepare_checkout(self.cart.state(), credential, self.prescription.as_ref())?;
        debug!(intent_id = %intent.intent_id, lines = intent.items.len(), "Submitting order");

        let order = self.scope.run(self.client.place_order(&intent)).await?;

        if let Err(e) = self.cart.clear() {
            warn!(error = %e, "Order placed but the emptied cart could not be saved");
        }
        self.prescription = None;
        self.promo_code = None;

        Ok(order)
    }

    pub async fn order(&self, order_id: &str) -> ClientResult<Order> {
        self.scope.run(self.client.get_order(order_id)).await
    }

    pub async fn orders(&self, query: &OrderQuery) -> ClientResult<OrderPage> {
        self.scope.run(self.client.list_orders(query)).await
    }

    /// Requests a payment link for `order`.
    ///
    /// Checked locally first; an order that cannot take a payment never
    /// reaches the backend.
    pub async fn payment_url(&self, order: &Order) -> ClientResult<String> {
        ensure_payment_applicable(order)?;
        let _permit = self.guard.try_begin(format!("pay:{}", order.order_id))?;

        let link = self
            .scope
            .run(self.client.create_payment_link(&order.order_id))
            .await?;
        info!(order_id = %order.order_id, "Payment link issued");
        Ok(link.payment_url)
    }

    pub async fn payment_for_order(&self, order_id: &str) -> ClientResult<Payment> {
        self.scope.run(self.client.get_payment_for_order(order_id)).await
    }

    pub async fn payment(&self, payment_id: &str) -> ClientResult<Payment> {
        self.scope.run(self.client.get_payment(payment_id)).await
    }

    // =========================================================================
    // Reminders
    // =========================================================================

    pub async fn reminders(&self) -> ClientResult<Vec<Reminder>> {
        self.scope.run(self.client.list_reminders()).await
    }

    pub async fn create_reminder(&self, reminder: &Reminder) -> ClientResult<Reminder> {
        let _permit = self.guard.try_begin("create_reminder")?;
        let created = self.scope.run(self.client.create_reminder(reminder)).await?;
        info!(reminder_id = ?created.id, "Reminder created");
        Ok(created)
    }

    pub async fn update_reminder(&self, id: &str, reminder: &Reminder) -> ClientResult<Reminder> {
        let _permit = self.guard.try_begin(format!("reminder:{}", id))?;
        self.scope.run(self.client.update_reminder(id, reminder)).await
    }

    pub async fn toggle_reminder(&self, id: &str) -> ClientResult<Reminder> {
        let _permit = self.guard.try_begin(format!("reminder:{}", id))?;
        self.scope.run(self.client.toggle_reminder(id)).await
    }

    pub async fn delete_reminder(&self, id: &str) -> ClientResult<()> {
        let _permit = self.guard.try_begin(format!("reminder:{}", id))?;
        self.scope.run(self.client.delete_reminder(id)).await?;
        info!(reminder_id = id, "Reminder deleted");
        Ok(())
    }

    pub async fn reminder_logs(&self, id: &str) -> ClientResult<Vec<ReminderLog>> {
        self.scope.run(self.client.reminder_logs(id)).await
    }
}
