//! # Admin Back Office
//!
//! Order management, stock adjustments and reminder oversight.
//!
//! Status changes go through the lifecycle state machine before any request
//! is sent. The backend has the final word: when it refuses, its message is
//! returned verbatim as `TransitionRejected`.

use pharma_core::lifecycle::{transition, OrderEvent};
use pharma_core::{InventoryLog, Order, OrderPage, OrderStatus, Product, Reminder, StockAdjustment};
use tracing::{debug, info};

use crate::api::OrderQuery;
use crate::error::ClientResult;
use crate::http::BackendClient;
use crate::request::{ActionGuard, RequestScope};

/// An administrator's session against the backend.
#[derive(Debug, Clone)]
pub struct Admin {
    client: BackendClient,
    guard: ActionGuard,
    scope: RequestScope,
}

impl Admin {
    /// `client` must carry an administrator credential.
    pub fn new(client: BackendClient) -> Self {
        Admin {
            client,
            guard: ActionGuard::new(),
            scope: RequestScope::new(),
        }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub async fn orders(&self, query: &OrderQuery) -> ClientResult<OrderPage> {
        debug!(page = query.page, limit = query.limit, "Listing all orders");
        self.scope.run(self.client.list_all_orders(query)).await
    }

    pub async fn order(&self, order_id: &str) -> ClientResult<Order> {
        self.scope.run(self.client.get_order(order_id)).await
    }

    /// Moves `order` to `target`.
    ///
    /// ## Local Checks
    /// - `target` must be one of approved, shipped, completed, cancelled
    /// - `target` must differ from the current status
    /// - one update per order at a time
    pub async fn update_order_status(
        &self,
        order: &Order,
        target: OrderStatus,
        notes: Option<&str>,
    ) -> ClientResult<Order> {
        let next = transition(order, &OrderEvent::AdminSetStatus(target))?;
        let _permit = self
            .guard
            .try_begin(format!("update_status:{}", order.order_id))?;

        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let updated = self
            .scope
            .run(self.client.update_order_status(&order.order_id, &next, notes))
            .await?;

        info!(
            order_id = %order.order_id,
            from = %order.status,
            to = %updated.status,
            "Order status updated"
        );
        Ok(updated)
    }

    /// Applies a stock change to a product.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        quantity_change: i64,
        reason: &str,
    ) -> ClientResult<Product> {
        let adjustment = StockAdjustment {
            quantity_change,
            reason: reason.trim().to_string(),
        };
        let _permit = self.guard.try_begin(format!("stock:{}", product_id))?;

        let product = self
            .scope
            .run(self.client.adjust_stock(product_id, &adjustment))
            .await?;
        info!(
            product_id,
            quantity_change,
            stock = product.stock,
            "Stock adjusted"
        );
        Ok(product)
    }

    pub async fn inventory_logs(&self, product_id: &str) -> ClientResult<Vec<InventoryLog>> {
        self.scope.run(self.client.inventory_logs(product_id)).await
    }

    pub async fn reminders(&self) -> ClientResult<Vec<Reminder>> {
        self.scope.run(self.client.list_all_reminders()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use crate::error::ClientError;
    use pharma_core::{CoreError, ValidationError};

    fn admin() -> Admin {
        let client = BackendClient::new(&BackendSettings {
            url: "http://127.0.0.1:9".to_string(),
            ..BackendSettings::default()
        })
        .unwrap();
        Admin::new(client)
    }

    fn order(status: &str) -> Order {
        serde_json::from_str(&format!(r#"{{"order_id": "o-1", "status": "{}"}}"#, status)).unwrap()
    }

    #[tokio::test]
    async fn test_same_status_goes_to_backend() {
        // Nothing listens on the test address, so reaching the network
        // shows the update was not refused locally.
        let err = admin()
            .update_order_status(&order("shipped"), OrderStatus::Shipped, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_non_admin_target_rejected_locally() {
        let err = admin()
            .update_order_status(&order("approved"), OrderStatus::Paid, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(ValidationError::NotAllowed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_zero_stock_change_rejected_locally() {
        let err = admin().adjust_stock("p-1", 0, "recount").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(ValidationError::MustBeNonZero { .. }))
        ));
    }
}
