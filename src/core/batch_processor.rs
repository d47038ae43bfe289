//! Batch processing with credit-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which applies batches of balance
//! operations concurrently while keeping the order of operations on any single credit.
//!
//! # Design
//!
//! A batch is partitioned by credit id. Each partition runs on its own tokio task and
//! applies its operations sequentially, so two operations on the same credit never race
//! inside one batch. Operations on different credits share nothing but the store.
//!
//! Writers outside the batch can still move a record between its read and its save. Those
//! version conflicts are retried by repeating the full read-modify-write cycle, up to
//! `max_conflict_retries` extra attempts.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── CreditService   (shared, cloneable)
//!     └── BatchConfig     (retry budget)
//! ```
//!
//! # Thread Safety
//!
//! The processor is cloneable and every clone drives the same service.

use std::collections::HashMap;

use tracing::{debug, error, warn};

use super::credit_service::CreditService;
use crate::config::BatchConfig;
use crate::types::{CreditError, CreditId, CreditRecord, OperationRecord};

/// Outcome of one operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was applied
    pub record: OperationRecord,

    /// The saved credit, or the error that ended the last attempt
    pub result: Result<CreditRecord, CreditError>,
}

/// Batch processor with credit-based partitioning
#[derive(Clone)]
pub struct BatchProcessor {
    service: CreditService,
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(service: CreditService, config: BatchConfig) -> Self {
        Self { service, config }
    }

    /// Partition a batch of operations by credit id
    ///
    /// # Returns
    ///
    /// A map from credit id to that credit's operations, in their original order.
    pub fn partition_by_credit(
        &self,
        batch: Vec<OperationRecord>,
    ) -> HashMap<CreditId, Vec<OperationRecord>> {
        let mut credit_batches: HashMap<CreditId, Vec<OperationRecord>> = HashMap::new();

        for record in batch {
            credit_batches
                .entry(record.credit_id.clone())
                .or_default()
                .push(record);
        }

        credit_batches
    }

    /// Apply one credit's operations in order
    ///
    /// A failed operation is recorded and the next one still runs.
    pub async fn process_credit_operations(
        &self,
        operations: Vec<OperationRecord>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(operations.len());

        for record in operations {
            let result = self.apply_with_retry(&record).await;
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Apply a batch with one task per credit
    ///
    /// # Returns
    ///
    /// One result per operation. Results of different credits may interleave in any
    /// order; results of one credit keep their input order.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let credit_batches = self.partition_by_credit(batch);

        let mut tasks = Vec::with_capacity(credit_batches.len());
        for (_credit_id, operations) in credit_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_credit_operations(operations).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(credit_results) => results.extend(credit_results),
                Err(e) => error!(error = %e, "credit task panicked"),
            }
        }

        results
    }

    async fn apply_with_retry(&self, record: &OperationRecord) -> Result<CreditRecord, CreditError> {
        let mut attempt = 0;
        loop {
            match self
                .service
                .apply_operation(&record.credit_id, &record.operation)
                .await
            {
                Err(err) if err.is_retryable() && attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    debug!(
                        credit_id = %record.credit_id,
                        attempt,
                        "retrying after version conflict"
                    );
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        credit_id = %record.credit_id,
                        attempts = attempt + 1,
                        "giving up after repeated version conflicts"
                    );
                    return Err(err);
                }
                outcome => return outcome,
            }
        }
    }
}
