//! Replay of an operations file against in-memory collaborators
//!
//! The replay is the crate's end-to-end pipeline:
//!
//! 1. Load the customer and account directories from their CSV files
//! 2. Run every `create` row sequentially, in file order
//! 3. Re-read the file in batches and hand the balance operations to the batch processor
//! 4. Write the final credit records as CSV
//!
//! Creations go first and one at a time because they depend on one another: the personal
//! loan limit and the delinquency gate both look at credits created earlier in the file.
//!
//! Balance operations therefore never influence a creation. A payment that settles an
//! overdue credit does not lift the delinquency gate for a `create` row further down the
//! file; that row sees the credit as it stood after the creation pass.
//!
//! Credit numbers are not unique. When several `create` rows share one, operations on that
//! number go to the first credit created and the duplicate is reported with a warning.
//!
//! # Error Handling
//!
//! Fatal errors (missing file, runtime failure, output failure) are returned. A row that
//! cannot be parsed or an operation the engine rejects is logged and the replay continues.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{info, warn};

use crate::config::{BatchConfig, EngineConfig};
use crate::core::{
    BatchProcessor, Clock, CreditService, CreditStore, InMemoryAccountDirectory,
    InMemoryCreditStore, InMemoryCustomerDirectory, InMemoryTransactionHistory,
};
use crate::io::{
    write_credits_csv, AccountCsvRecord, AsyncReader, CustomerCsvRecord, OpsCsvRecord, SyncReader,
};
use crate::types::{CreditError, CreditId, OperationRecord, ReplayOperation};

/// Files consumed by a replay
#[derive(Debug, Clone)]
pub struct ReplayInputs {
    pub operations: PathBuf,
    pub customers: Option<PathBuf>,
    pub accounts: Option<PathBuf>,
}

/// Counters reported at the end of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub created: usize,
    pub applied: usize,
    pub rejected: usize,
}

/// Replay driver
pub struct Replay {
    engine_config: EngineConfig,
    batch_config: BatchConfig,
    clock: Arc<dyn Clock>,
}

impl Replay {
    pub fn new(engine_config: EngineConfig, batch_config: BatchConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine_config,
            batch_config,
            clock,
        }
    }

    /// Run the replay on a dedicated multi-threaded runtime
    ///
    /// The runtime gets `max_concurrent_batches` worker threads.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the runtime cannot start, plus any fatal error of
    /// [`run_async`](Self::run_async).
    pub fn run(&self, inputs: &ReplayInputs, output: &mut dyn Write) -> Result<ReplaySummary, CreditError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch_config.max_concurrent_batches)
            .enable_time()
            .build()
            .map_err(|e| CreditError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(self.run_async(inputs, output))
    }

    /// Run the replay on the current runtime
    ///
    /// # Errors
    ///
    /// * `FileNotFound` - an input file does not exist
    /// * `IoError` / `ParseError` - an input cannot be read or the output cannot be written
    pub async fn run_async(
        &self,
        inputs: &ReplayInputs,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, CreditError> {
        let customers = Arc::new(InMemoryCustomerDirectory::new());
        if let Some(path) = &inputs.customers {
            for (id, customer_type) in read_rows::<CustomerCsvRecord>(path)? {
                customers.insert(id, customer_type);
            }
        }
        let accounts = Arc::new(InMemoryAccountDirectory::new());
        if let Some(path) = &inputs.accounts {
            for account in read_rows::<AccountCsvRecord>(path)? {
                accounts.insert(account);
            }
        }

        let store = Arc::new(InMemoryCreditStore::new());
        let service = CreditService::new(
            Arc::clone(&store) as Arc<dyn CreditStore>,
            customers,
            accounts,
            Arc::new(InMemoryTransactionHistory::new()),
            Arc::clone(&self.clock),
            self.engine_config.clone(),
        );

        let mut summary = ReplaySummary::default();
        let mut ids_by_number: HashMap<String, CreditId> = HashMap::new();

        let mut reader = open_operations(&inputs.operations).await?;
        loop {
            let batch = reader.read_batch(self.batch_config.batch_size).await;
            if batch.is_empty() {
                break;
            }
            for operation in batch {
                if let ReplayOperation::Create(request) = operation {
                    match service.create_credit(request).await {
                        Ok(record) => {
                            summary.created += 1;
                            match ids_by_number.entry(record.credit_number) {
                                Entry::Vacant(slot) => {
                                    slot.insert(record.id);
                                }
                                Entry::Occupied(slot) => warn!(
                                    credit_number = %slot.key(),
                                    kept = %slot.get(),
                                    ignored = %record.id,
                                    "duplicate credit number, operations go to the first credit"
                                ),
                            }
                        }
                        Err(_) => summary.rejected += 1,
                    }
                }
            }
        }

        let processor = BatchProcessor::new(service, self.batch_config.clone());
        let mut reader = open_operations(&inputs.operations).await?;
        loop {
            let batch = reader.read_batch(self.batch_config.batch_size).await;
            if batch.is_empty() {
                break;
            }

            let mut resolved = Vec::with_capacity(batch.len());
            for operation in batch {
                let ReplayOperation::Apply {
                    credit_number,
                    operation,
                } = operation
                else {
                    continue;
                };
                match ids_by_number.get(&credit_number) {
                    Some(credit_id) => resolved.push(OperationRecord {
                        credit_id: credit_id.clone(),
                        operation,
                    }),
                    None => {
                        warn!(credit_number = %credit_number, "operation on unknown credit");
                        summary.rejected += 1;
                    }
                }
            }

            // Wait for the batch before reading the next so per-credit order holds across batches
            for result in processor.process_batch(resolved).await {
                match result.result {
                    Ok(_) => summary.applied += 1,
                    Err(_) => summary.rejected += 1,
                }
            }
        }

        write_credits_csv(&store.list_all().await?, output)?;

        info!(
            created = summary.created,
            applied = summary.applied,
            rejected = summary.rejected,
            "replay finished"
        );
        Ok(summary)
    }
}

fn read_rows<C: crate::io::CsvRow>(path: &Path) -> Result<Vec<C::Output>, CreditError> {
    let mut rows = Vec::new();
    for row in SyncReader::<C>::new(path)? {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping row"),
        }
    }
    Ok(rows)
}

async fn open_operations(
    path: &Path,
) -> Result<AsyncReader<tokio_util::compat::Compat<tokio::fs::File>, OpsCsvRecord>, CreditError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CreditError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CreditError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })?;

    Ok(AsyncReader::new(file.compat()))
}
