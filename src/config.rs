//! Engine and batch configuration
//!
//! Both configs are built through a `new` constructor that replaces invalid values with
//! the default and logs a warning, so a bad command-line flag degrades instead of aborting.

use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

/// Tunables of the credit service
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on every collaborator call
    pub upstream_timeout: Duration,
    /// Share of the outstanding card balance due as minimum payment
    pub minimum_payment_rate: Decimal,
    /// Days from today to the due date reported in balance summaries
    pub balance_due_days: u32,
    /// Validity of a newly issued debit card
    pub debit_card_validity_years: u32,
    /// Currency code reported in balance summaries
    pub currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(2),
            minimum_payment_rate: Decimal::new(5, 2),
            balance_due_days: 15,
            debit_card_validity_years: 3,
            currency: "PEN".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create an EngineConfig, falling back to defaults for invalid values
    ///
    /// A zero timeout, a rate outside `[0, 1]`, a zero card validity or a blank currency
    /// are each replaced by the default.
    pub fn new(
        upstream_timeout: Duration,
        minimum_payment_rate: Decimal,
        balance_due_days: u32,
        debit_card_validity_years: u32,
        currency: impl Into<String>,
    ) -> Self {
        let default = Self::default();

        let upstream_timeout = if upstream_timeout.is_zero() {
            warn!(
                ?upstream_timeout,
                default = ?default.upstream_timeout,
                "invalid upstream_timeout, using default"
            );
            default.upstream_timeout
        } else {
            upstream_timeout
        };

        let minimum_payment_rate =
            if minimum_payment_rate.is_sign_negative() || minimum_payment_rate > Decimal::ONE {
                warn!(
                    %minimum_payment_rate,
                    default = %default.minimum_payment_rate,
                    "invalid minimum_payment_rate, using default"
                );
                default.minimum_payment_rate
            } else {
                minimum_payment_rate
            };

        let debit_card_validity_years = if debit_card_validity_years == 0 {
            warn!(
                debit_card_validity_years,
                default = default.debit_card_validity_years,
                "invalid debit_card_validity_years, using default"
            );
            default.debit_card_validity_years
        } else {
            debit_card_validity_years
        };

        let currency = currency.into();
        let currency = if currency.trim().is_empty() {
            warn!(default = %default.currency, "blank currency, using default");
            default.currency
        } else {
            currency
        };

        Self {
            upstream_timeout,
            minimum_payment_rate,
            balance_due_days,
            debit_card_validity_years,
            currency,
        }
    }

    /// Default config with a custom collaborator timeout
    pub fn with_upstream_timeout(upstream_timeout: Duration) -> Self {
        let default = Self::default();
        Self::new(
            upstream_timeout,
            default.minimum_payment_rate,
            default.balance_due_days,
            default.debit_card_validity_years,
            default.currency,
        )
    }
}

/// Configuration for batch processing
///
/// Controls how operations are batched, how many worker threads run them and how often a
/// version conflict is retried before the operation is reported as failed.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads of the replay runtime
    pub max_concurrent_batches: usize,
    /// Retries of a read-modify-write cycle after a version conflict
    pub max_conflict_retries: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
            max_conflict_retries: 3,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    pub fn new(batch_size: usize, max_concurrent_batches: usize, max_conflict_retries: u32) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        let max_conflict_retries = if max_conflict_retries == 0 {
            warn!(
                max_conflict_retries,
                default = default.max_conflict_retries,
                "invalid max_conflict_retries, using default"
            );
            default.max_conflict_retries
        } else {
            max_conflict_retries
        };

        Self {
            batch_size,
            max_concurrent_batches,
            max_conflict_retries,
        }
    }
}
