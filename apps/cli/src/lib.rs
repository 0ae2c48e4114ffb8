//! # PharmaCart CLI Library
//!
//! Command dispatch for the `pharma` binary. `main.rs` parses arguments and
//! prints; everything else lives here so it can be tested.
//!
//! ## Module Organization
//! ```text
//! pharma_cli/
//! ├── lib.rs          ◄─── You are here (tracing setup & dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state.rs        ◄─── AppState: config, token, sessions
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   ├── orders.rs   ◄─── Checkout, order history, payment links
//! │   ├── reminders.rs◄─── Medication reminders
//! │   ├── admin.rs    ◄─── Back-office commands
//! │   └── config.rs   ◄─── Configuration commands
//! └── error.rs        ◄─── CliError { code, message }
//! ```
//!
//! ## Output
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  success ──► stdout: pretty JSON response, exit 0                       │
//! │  failure ──► stderr: {"code": "PRESCRIPTION_REQUIRED", "message": ..},  │
//! │              exit 1                                                     │
//! │  logs    ──► stderr (RUST_LOG)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use pharma_client::ClientConfig;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use cli::{AdminCommand, CartCommand, Cli, Command, ConfigCommand, OrdersCommand, RemindersCommand};
use commands::cart::NewLine;
use error::CliResult;
use state::AppState;

/// Runs one command and returns its response as JSON.
pub async fn run(cli: Cli) -> CliResult<Value> {
    let config = ClientConfig::load(cli.config.clone())?;
    debug!(backend = %config.backend_url(), "Configuration loaded");
    let state = AppState::new(config, cli.token);

    match cli.command {
        Command::Cart(command) => run_cart(&state, command),
        Command::Checkout {
            prescription,
            promo,
        } => {
            let mut shop = state.storefront()?;
            to_json(
                commands::orders::checkout(&mut shop, prescription.as_deref(), promo.as_deref())
                    .await?,
            )
        }
        Command::Orders(command) => run_orders(&state, command).await,
        Command::Reminders(command) => run_reminders(&state, command).await,
        Command::Admin(command) => run_admin(&state, command).await,
        Command::Config(ConfigCommand::Show) => {
            to_json(commands::config::show(&state.config, cli.config))
        }
        Command::Config(ConfigCommand::Save) => {
            to_json(commands::config::save(&state.config, cli.config)?)
        }
    }
}

fn run_cart(state: &AppState, command: CartCommand) -> CliResult<Value> {
    let mut shop = state.storefront()?;
    let response = match command {
        CartCommand::Show { promo } => commands::cart::show(&shop, promo.as_deref()),
        CartCommand::Add {
            product_id,
            name,
            price,
            quantity,
            rx,
            image_url,
        } => commands::cart::add(
            &mut shop,
            NewLine {
                product_id,
                name,
                price,
                quantity,
                requires_prescription: rx,
                image_url,
            },
        )?,
        CartCommand::Update {
            product_id,
            quantity,
        } => commands::cart::update(&mut shop, &product_id, quantity)?,
        CartCommand::Remove { product_id } => commands::cart::remove(&mut shop, &product_id)?,
        CartCommand::Clear => commands::cart::clear(&mut shop)?,
    };
    to_json(response)
}

async fn run_orders(state: &AppState, command: OrdersCommand) -> CliResult<Value> {
    let shop = state.storefront()?;
    match command {
        OrdersCommand::List(args) => to_json(commands::orders::list(&shop, &args.to_query()).await?),
        OrdersCommand::Show { order_id } => to_json(commands::orders::show(&shop, &order_id).await?),
        OrdersCommand::Pay { order_id } => to_json(commands::orders::pay(&shop, &order_id).await?),
        OrdersCommand::Payment { order_id } => {
            to_json(commands::orders::payment(&shop, &order_id).await?)
        }
    }
}

async fn run_reminders(state: &AppState, command: RemindersCommand) -> CliResult<Value> {
    let shop = state.storefront()?;
    match command {
        RemindersCommand::List => to_json(commands::reminders::list(&shop).await?),
        RemindersCommand::Create {
            title,
            description,
            at,
        } => to_json(
            commands::reminders::create(&shop, &title, description.as_deref(), &at).await?,
        ),
        RemindersCommand::Toggle { id } => to_json(commands::reminders::toggle(&shop, &id).await?),
        RemindersCommand::Delete { id } => to_json(commands::reminders::delete(&shop, &id).await?),
        RemindersCommand::Logs { id } => to_json(commands::reminders::logs(&shop, &id).await?),
    }
}

async fn run_admin(state: &AppState, command: AdminCommand) -> CliResult<Value> {
    let admin = state.admin()?;
    match command {
        AdminCommand::Orders(args) => to_json(commands::admin::orders(&admin, &args.to_query()).await?),
        AdminCommand::Order { order_id } => to_json(commands::admin::order(&admin, &order_id).await?),
        AdminCommand::SetStatus {
            order_id,
            status,
            notes,
        } => to_json(
            commands::admin::set_status(&admin, &order_id, status, notes.as_deref()).await?,
        ),
        AdminCommand::Stock {
            product_id,
            change,
            reason,
        } => to_json(commands::admin::adjust_stock(&admin, &product_id, change, &reason).await?),
        AdminCommand::Logs { product_id } => {
            to_json(commands::admin::inventory_logs(&admin, &product_id).await?)
        }
        AdminCommand::Reminders => to_json(commands::admin::reminders(&admin).await?),
    }
}

fn to_json<T: Serialize>(value: T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pharma_client=trace` - Show trace for the client crate only
/// - Default: INFO level, DEBUG for pharma crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharma=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}
