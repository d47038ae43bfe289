use crate::config::{BatchConfig, EngineConfig};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Replay credit operations and print the resulting credits
#[derive(Parser, Debug)]
#[command(name = "credit-engine")]
#[command(about = "Replay credit operations and print the resulting credits", long_about = None)]
pub struct CliArgs {
    /// Operations CSV file
    #[arg(value_name = "OPERATIONS", help = "Path to the operations CSV file")]
    pub operations_file: PathBuf,

    /// Customers CSV file (id,customer_type)
    #[arg(long = "customers", value_name = "FILE")]
    pub customers_file: Option<PathBuf>,

    /// Accounts CSV file (id,customer,status,balance)
    #[arg(long = "accounts", value_name = "FILE")]
    pub accounts_file: Option<PathBuf>,

    /// Pin the engine clock to this date instead of the local date
    #[arg(long = "today", value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Number of operations per batch
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads of the replay runtime
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads processing batches (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Retries after a version conflict
    #[arg(long = "max-retries", value_name = "COUNT")]
    pub max_conflict_retries: Option<u32>,

    /// Upper bound on each collaborator call, in milliseconds
    #[arg(long = "upstream-timeout-ms", value_name = "MILLIS")]
    pub upstream_timeout_ms: Option<u64>,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments, filling gaps with defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none()
            && self.max_concurrent_batches.is_none()
            && self.max_conflict_retries.is_none()
        {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
            self.max_conflict_retries
                .unwrap_or(default.max_conflict_retries),
        )
    }

    /// Create an EngineConfig from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        match self.upstream_timeout_ms {
            Some(millis) => EngineConfig::with_upstream_timeout(Duration::from_millis(millis)),
            None => EngineConfig::default(),
        }
    }
}
