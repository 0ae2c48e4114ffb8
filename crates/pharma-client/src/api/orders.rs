//! Order endpoints: placement, lookup, listing, payment links and admin
//! status updates.

use std::fmt;
use std::str::FromStr;

use pharma_core::{Order, OrderIntent, OrderItem, OrderPage, OrderStatus, PaymentLink};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::http::BackendClient;

/// Header carrying the client-generated order intent id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =============================================================================
// Listing Query
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ClientError::InvalidConfig(format!(
                "sort order must be asc or desc, got: {}",
                other
            ))),
        }
    }
}

/// Comparison applied by a listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Gt,
    Lt,
    /// Case-insensitive pattern match.
    Ilike,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Ilike => "ilike",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(FilterOperator::Eq),
            "gt" => Ok(FilterOperator::Gt),
            "lt" => Ok(FilterOperator::Lt),
            "ilike" => Ok(FilterOperator::Ilike),
            other => Err(ClientError::InvalidConfig(format!(
                "filter operator must be one of eq, gt, lt, ilike, got: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// Paging, sorting and filtering for order listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub filter: Option<OrderFilter>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        OrderQuery {
            page: 1,
            limit: 10,
            sort_by: "created_at".to_string(),
            sort_order: SortOrder::Desc,
            filter: None,
        }
    }
}

impl OrderQuery {
    /// Query string pairs, in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
            ("sort_by", self.sort_by.clone()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        if let Some(filter) = &self.filter {
            pairs.push(("filter_column", filter.column.clone()));
            pairs.push(("filter_operator", filter.operator.as_str().to_string()));
            pairs.push(("filter_value", filter.value.clone()));
        }
        pairs
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Serialize)]
struct ItemsPayload<'a> {
    items: &'a [OrderItem],
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

// =============================================================================
// Endpoints
// =============================================================================

impl BackendClient {
    /// `GET /orders/{id}`
    pub async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let builder = self.request(Method::GET, &["orders", order_id])?;
        self.send_json(builder).await
    }

    /// `GET /orders` for the signed-in customer.
    pub async fn list_orders(&self, query: &OrderQuery) -> ClientResult<OrderPage> {
        let builder = self.request(Method::GET, &["orders"])?.query(&query.to_pairs());
        self.send_json(builder).await
    }

    /// `GET /admin/orders`
    pub async fn list_all_orders(&self, query: &OrderQuery) -> ClientResult<OrderPage> {
        let builder = self
            .request(Method::GET, &["admin", "orders"])?
            .query(&query.to_pairs());
        self.send_json(builder).await
    }

    /// `POST /orders` as multipart: `items` is a JSON document
    /// `{"items": [...]}`, `prescription` the optional file.
    pub async fn place_order(&self, intent: &OrderIntent) -> ClientResult<Order> {
        let items = intent.order_items();
        let items_json = serde_json::to_string(&ItemsPayload { items: &items })?;

        let mut form = Form::new().text("items", items_json);
        if let Some(prescription) = &intent.prescription {
            let part = Part::bytes(prescription.data().to_vec())
                .file_name(prescription.file_name().to_string())
                .mime_str(prescription.content_type())?;
            form = form.part("prescription", part);
        }

        let builder = self
            .request(Method::POST, &["orders"])?
            .header(REQUEST_ID_HEADER, intent.intent_id.to_string())
            .multipart(form);
        let order: Order = self.send_json(builder).await?;

        info!(
            order_id = %order.order_id,
            intent_id = %intent.intent_id,
            lines = items.len(),
            "Order placed"
        );
        Ok(order)
    }

    /// `POST /orders/{id}/payment`
    pub async fn create_payment_link(&self, order_id: &str) -> ClientResult<PaymentLink> {
        let builder = self.request(Method::POST, &["orders", order_id, "payment"])?;
        self.send_json(builder).await
    }

    /// `PUT /admin/orders/{id}`. A refusal comes back as `TransitionRejected`.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: &OrderStatus,
        notes: Option<&str>,
    ) -> ClientResult<Order> {
        let body = StatusUpdate {
            status: status.as_str(),
            notes,
        };
        let builder = self
            .request(Method::PUT, &["admin", "orders", order_id])?
            .json(&body);
        self.send_json(builder)
            .await
            .map_err(ClientError::into_transition_rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_pairs() {
        let pairs = OrderQuery::default().to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "1".to_string()),
                ("limit", "10".to_string()),
                ("sort_by", "created_at".to_string()),
                ("sort_order", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_filtered_query_pairs() {
        let query = OrderQuery {
            page: 0,
            filter: Some(OrderFilter {
                column: "status".to_string(),
                operator: FilterOperator::Eq,
                value: "shipped".to_string(),
            }),
            ..OrderQuery::default()
        };
        let pairs = query.to_pairs();
        assert_eq!(pairs[0], ("page", "1".to_string()));
        assert!(pairs.contains(&("filter_operator", "eq".to_string())));
        assert!(pairs.contains(&("filter_value", "shipped".to_string())));
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("ILIKE".parse::<FilterOperator>().unwrap(), FilterOperator::Ilike);
        assert!("contains".parse::<FilterOperator>().is_err());
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
