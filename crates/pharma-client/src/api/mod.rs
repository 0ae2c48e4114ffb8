//! # Backend Endpoints
//!
//! One module per resource, each adding methods to [`BackendClient`].
//!
//! | Module        | Endpoints                                            |
//! |---------------|------------------------------------------------------|
//! | [`orders`]    | `/orders`, `/orders/{id}`, `/orders/{id}/payment`,   |
//! |               | `/admin/orders`, `/admin/orders/{id}`                |
//! | [`payments`]  | `/payments/{id}`, `/payments/order/{order_id}`       |
//! | [`inventory`] | `/admin/products/{id}/stock`, `/admin/products/{id}/logs` |
//! | [`reminders`] | `/reminders`, `/reminders/{id}`, `/admin/reminders`  |
//!
//! [`BackendClient`]: crate::http::BackendClient

pub mod inventory;
pub mod orders;
pub mod payments;
pub mod reminders;

pub use orders::{FilterOperator, OrderFilter, OrderQuery, SortOrder};
