//! # Commands Module
//!
//! One function per user command. Each returns a serializable response or a
//! `CliError`; `lib.rs` decides how to print them.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── cart.rs       ◄─── Cart manipulation and totals
//! ├── orders.rs     ◄─── Checkout, order history, payment links
//! ├── reminders.rs  ◄─── Medication reminders
//! ├── admin.rs      ◄─── Order status, stock, inventory history
//! └── config.rs     ◄─── Configuration display and saving
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ pharma orders pay 42                                                 │
//! │         │                                                               │
//! │         │ (clap)                                                        │
//! │         ▼                                                               │
//! │  lib.rs: run(cli)                                                       │
//! │      AppState::storefront()  ◄── config, cart file, token               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::orders::pay(&shop, "42")                                     │
//! │      -> CliResult<PaymentUrlResponse>                                   │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout: { "orderId": "42", "paymentUrl": "https://..." }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are generic over `CartStorage` where they touch the cart, so
//! tests drive them with `MemoryStorage`.

pub mod admin;
pub mod cart;
pub mod config;
pub mod orders;
pub mod reminders;
