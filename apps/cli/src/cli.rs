//! # Command Line
//!
//! Argument definitions. Parsing only; `lib.rs` dispatches.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pharma_client::{FilterOperator, OrderFilter, OrderQuery, SortOrder};
use pharma_core::validation::validate_price_cents;
use pharma_core::{Money, OrderStatus};

#[derive(Debug, Parser)]
#[command(name = "pharma", version, about = "PharmaCart storefront and back office")]
pub struct Cli {
    /// Config file (default: platform config dir / pharmacart.toml)
    #[arg(long, global = true, env = "PHARMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "PHARMA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place an order from the cart
    Checkout {
        /// Prescription file (pdf, jpeg or png)
        #[arg(long)]
        prescription: Option<PathBuf>,

        #[arg(long)]
        promo: Option<String>,
    },

    /// Order history and payment
    #[command(subcommand)]
    Orders(OrdersCommand),

    /// Medication reminders
    #[command(subcommand)]
    Reminders(RemindersCommand),

    /// Back office
    #[command(subcommand)]
    Admin(AdminCommand),

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Items and totals
    Show {
        #[arg(long)]
        promo: Option<String>,
    },
    Add {
        product_id: String,
        #[arg(long)]
        name: String,
        /// Unit price, e.g. 12.99
        #[arg(long, value_parser = parse_price)]
        price: Money,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        /// Prescription-only product
        #[arg(long)]
        rx: bool,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    Remove {
        product_id: String,
    },
    Clear,
}

/// Paging, sorting and filtering shared by the order listings.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
    #[arg(long, default_value = "created_at")]
    pub sort_by: String,
    #[arg(long, default_value = "desc")]
    pub sort_order: SortOrder,
    /// Filter as COLUMN:OPERATOR:VALUE, e.g. status:eq:shipped
    #[arg(long, value_parser = parse_filter)]
    pub filter: Option<OrderFilter>,
}

impl ListArgs {
    pub fn to_query(&self) -> OrderQuery {
        OrderQuery {
            page: self.page,
            limit: self.limit,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
            filter: self.filter.clone(),
        }
    }
}

fn parse_price(raw: &str) -> Result<Money, String> {
    let price = raw.parse::<Money>().map_err(|e| e.to_string())?;
    validate_price_cents(price.cents()).map_err(|e| e.to_string())?;
    Ok(price)
}

fn parse_filter(raw: &str) -> Result<OrderFilter, String> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(column), Some(operator), Some(value)) if !column.is_empty() => {
            let operator = operator
                .parse::<FilterOperator>()
                .map_err(|e| e.to_string())?;
            Ok(OrderFilter {
                column: column.to_string(),
                operator,
                value: value.to_string(),
            })
        }
        _ => Err(format!("expected COLUMN:OPERATOR:VALUE, got '{}'", raw)),
    }
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    List(ListArgs),
    Show { order_id: String },
    /// Get a payment link for an order awaiting payment
    Pay { order_id: String },
    /// Payment recorded for an order
    Payment { order_id: String },
}

#[derive(Debug, Subcommand)]
pub enum RemindersCommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// When the reminder fires, e.g. 08:00
        #[arg(long)]
        at: String,
    },
    /// Switch a reminder on or off
    Toggle { id: String },
    Delete { id: String },
    Logs { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    Orders(ListArgs),
    Order { order_id: String },
    /// Move an order to approved, shipped, completed or cancelled
    SetStatus {
        order_id: String,
        status: OrderStatus,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change a product's stock level
    Stock {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        change: i64,
        #[arg(long)]
        reason: String,
    },
    /// Inventory history of a product
    Logs { product_id: String },
    Reminders,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    /// Write the effective configuration to the config file
    Save,
}
