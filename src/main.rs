//! Credit Engine CLI
//!
//! Replays a CSV file of credit operations against in-memory directories and prints the
//! resulting credits as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --customers customers.csv --accounts accounts.csv operations.csv > credits.csv
//! cargo run -- --today 2024-03-20 --batch-size 500 --max-concurrent 4 operations.csv
//! RUST_LOG=debug cargo run -- operations.csv
//! ```
//!
//! Logs go to stderr so stdout carries only the CSV.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use credit_engine::cli;
use credit_engine::core::{Clock, FixedClock, SystemClock};
use credit_engine::replay::{Replay, ReplayInputs};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let clock: Arc<dyn Clock> = match args.today {
        Some(today) => Arc::new(FixedClock::at_date(today)),
        None => Arc::new(SystemClock),
    };
    let replay = Replay::new(args.to_engine_config(), args.to_batch_config(), clock);
    let inputs = ReplayInputs {
        operations: args.operations_file.clone(),
        customers: args.customers_file.clone(),
        accounts: args.accounts_file.clone(),
    };

    let mut output = std::io::stdout();
    if let Err(e) = replay.run(&inputs, &mut output) {
        tracing::error!(error = %e, "replay failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
