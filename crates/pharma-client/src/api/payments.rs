//! Payment lookups. Payments are created and completed by the backend; the
//! client only reads them.

use pharma_core::Payment;
use reqwest::Method;

use crate::error::ClientResult;
use crate::http::BackendClient;

impl BackendClient {
    /// `GET /payments/{id}`
    pub async fn get_payment(&self, payment_id: &str) -> ClientResult<Payment> {
        let builder = self.request(Method::GET, &["payments", payment_id])?;
        self.send_json(builder).await
    }

    /// `GET /payments/order/{order_id}`
    pub async fn get_payment_for_order(&self, order_id: &str) -> ClientResult<Payment> {
        let builder = self.request(Method::GET, &["payments", "order", order_id])?;
        self.send_json(builder).await
    }
}
