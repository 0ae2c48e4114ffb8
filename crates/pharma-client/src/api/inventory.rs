//! Admin inventory endpoints.

use pharma_core::validation::validate_stock_adjustment;
use pharma_core::{CoreError, InventoryLog, Product, StockAdjustment};
use reqwest::Method;
use serde::Deserialize;

use crate::error::ClientResult;
use crate::http::BackendClient;

/// The log endpoint answers either with a bare list or `{ "logs": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LogsResponse {
    Bare(Vec<InventoryLog>),
    Wrapped { logs: Vec<InventoryLog> },
}

impl BackendClient {
    /// `PUT /admin/products/{id}/stock`
    ///
    /// Validated locally first: a zero change or a blank reason never
    /// leaves the client.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        adjustment: &StockAdjustment,
    ) -> ClientResult<Product> {
        validate_stock_adjustment(adjustment).map_err(CoreError::from)?;

        let builder = self
            .request(Method::PUT, &["admin", "products", product_id, "stock"])?
            .json(adjustment);
        self.send_json(builder).await
    }

    /// `GET /admin/products/{id}/logs`
    pub async fn inventory_logs(&self, product_id: &str) -> ClientResult<Vec<InventoryLog>> {
        let builder = self.request(Method::GET, &["admin", "products", product_id, "logs"])?;
        let logs = match self.send_json::<LogsResponse>(builder).await? {
            LogsResponse::Bare(logs) | LogsResponse::Wrapped { logs } => logs,
        };
        Ok(logs)
    }
}
