//! # Admin Commands
//!
//! Back-office order management and stock control.
//!
//! ```text
//! pharma admin set-status 42 shipped --notes "DHL 123"
//!      │
//!      ├── GET order 42
//!      ├── lifecycle check (target allowed, differs from current)
//!      └── PUT /admin/orders/42 ──► refused? backend message verbatim
//! ```

use pharma_client::{Admin, OrderQuery};
use pharma_core::{Actor, InventoryLog, OrderPage, OrderStatus, Product, Reminder};
use tracing::debug;

use crate::commands::orders::{OrderView, LOAD_ORDER_FALLBACK};
use crate::error::{CliError, CliResult};

pub const UPDATE_STATUS_FALLBACK: &str = "Failed to update order status.";

pub async fn orders(admin: &Admin, query: &OrderQuery) -> CliResult<OrderPage> {
    admin
        .orders(query)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load orders."))
}

/// Shows an order with the status changes an admin may apply.
pub async fn order(admin: &Admin, order_id: &str) -> CliResult<OrderView> {
    let order = admin
        .order(order_id)
        .await
        .map_err(|e| CliError::from_client(e, LOAD_ORDER_FALLBACK))?;
    Ok(OrderView::new(order, Actor::Admin))
}

/// Moves an order to `target`.
pub async fn set_status(
    admin: &Admin,
    order_id: &str,
    target: OrderStatus,
    notes: Option<&str>,
) -> CliResult<OrderView> {
    debug!(order_id, target = %target, "admin set-status");
    let current = admin
        .order(order_id)
        .await
        .map_err(|e| CliError::from_client(e, LOAD_ORDER_FALLBACK))?;

    let updated = admin
        .update_order_status(&current, target, notes)
        .await
        .map_err(|e| CliError::from_client(e, UPDATE_STATUS_FALLBACK))?;
    Ok(OrderView::new(updated, Actor::Admin))
}

pub async fn adjust_stock(
    admin: &Admin,
    product_id: &str,
    quantity_change: i64,
    reason: &str,
) -> CliResult<Product> {
    admin
        .adjust_stock(product_id, quantity_change, reason)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to adjust stock."))
}

pub async fn inventory_logs(admin: &Admin, product_id: &str) -> CliResult<Vec<InventoryLog>> {
    admin
        .inventory_logs(product_id)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load inventory history."))
}

pub async fn reminders(admin: &Admin) -> CliResult<Vec<Reminder>> {
    admin
        .reminders()
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load reminders."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pharma_client::{BackendClient, BackendSettings, Credential};

    fn admin() -> Admin {
        let client = BackendClient::new(&BackendSettings {
            url: "http://127.0.0.1:9".to_string(),
            ..BackendSettings::default()
        })
        .unwrap();
        Admin::new(client.with_credential(Credential::new("admin")))
    }

    #[tokio::test]
    async fn test_stock_zero_change_is_validation_error() {
        let err = adjust_stock(&admin(), "p-1", 0, "recount").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_network_error() {
        let err = set_status(&admin(), "42", OrderStatus::Shipped, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }
}
