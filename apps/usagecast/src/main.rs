//! # Usagecast
//!
//! Projects table usage facts into three storage models.
//!
//! ## Usage
//!
//! ```bash
//! # Project everything to stdout
//! usagecast project -i facts.json
//!
//! # One JSON Lines file per sequence
//! usagecast project -i facts.jsonl -t jsonl -m graph,catalog -o out/
//!
//! # Check that two runs agree
//! usagecast fingerprint -i facts.json
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use usagecast::cli;

fn main() {
    // USAGECAST_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("USAGECAST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_env("USAGECAST_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "usagecast=info,usagecast_core=info".into());

    // Logs go to stderr; stdout carries units.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
