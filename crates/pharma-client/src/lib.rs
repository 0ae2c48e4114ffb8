//! # pharma-client: Backend Client for PharmaCart
//!
//! Configuration, HTTP access to the PharmaCart backend, cart persistence on
//! disk, and the storefront and admin sessions built on `pharma-core`.
//!
//! ## Module Structure
//! ```text
//! pharma-client/
//! ├── lib.rs          ← You are here (public API)
//! ├── config.rs       ← TOML + environment configuration
//! ├── error.rs        ← ClientError and user-facing messages
//! ├── http.rs         ← BackendClient (reqwest), Credential
//! ├── api/            ← One module per backend resource
//! │   ├── orders.rs
//! │   ├── payments.rs
//! │   ├── inventory.rs
//! │   └── reminders.rs
//! ├── storage.rs      ← FileStorage (CartStorage on disk)
//! ├── request.rs      ← ActionGuard, RequestScope
//! ├── storefront.rs   ← Shopper session: cart, Rx, checkout, orders
//! └── admin.rs        ← Back office: order status, stock, reminders
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use pharma_client::{BackendClient, ClientConfig, Credential, FileStorage, Storefront};
//! use pharma_core::{CartItem, CartStore, Money};
//!
//! # async fn run() -> pharma_client::ClientResult<()> {
//! let config = ClientConfig::load(None)?;
//! let client = BackendClient::new(&config.backend)?;
//! let storage = FileStorage::open("/tmp/pharmacart")?;
//! let cart = CartStore::open(storage)?;
//!
//! let mut shop = Storefront::new(client, cart, config.pricing.clone());
//! shop.add_to_cart(CartItem::new("vit-c", "Vitamin C", Money::from_cents(1299), 1))?;
//! if let Some(credential) = Credential::new("token-from-login") {
//!     shop.sign_in(credential);
//! }
//! let order = shop.place_order().await?;
//! println!("placed order {}", order.order_id);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod storage;
pub mod storefront;

pub use admin::Admin;
pub use api::{FilterOperator, OrderFilter, OrderQuery, SortOrder};
pub use config::{BackendSettings, ClientConfig, StorageSettings};
pub use error::{ClientError, ClientResult, NETWORK_ERROR_MESSAGE};
pub use http::{BackendClient, Credential};
pub use request::{ActionGuard, ActionPermit, RequestScope};
pub use storage::FileStorage;
pub use storefront::Storefront;
