//! # PharmaCart CLI Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments (clap)
//! 2. Initialize tracing (logging to stderr)
//! 3. Load configuration (defaults → pharmacart.toml → PHARMA_* variables)
//! 4. Run the command
//! 5. Print the JSON response, or the error and exit with status 1

use std::process::ExitCode;

use clap::Parser;
use pharma_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    pharma_cli::init_tracing();

    match pharma_cli::run(cli).await {
        Ok(response) => {
            match serde_json::to_string_pretty(&response) {
                Ok(text) => println!("{}", text),
                Err(_) => println!("{}", response),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(code = ?err.code, "Command failed");
            match serde_json::to_string(&err) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}
