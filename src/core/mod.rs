//! Core business logic module
//!
//! This module contains the credit engine components:
//! - `traits` - Collaborator abstractions (store, directories, history)
//! - `validation_engine` - Creation rules and the delinquency gate
//! - `creation` - Initial balances of a validated request
//! - `balance_mutator` - Payment, consumption and third-party payment state machine
//! - `ledger_reconstructor` - Current-month daily balance trail
//! - `inquiry_responder` - Balance-sufficiency answers
//! - `credit_service` - Orchestration of every operation
//! - `batch_processor` - Concurrent replay of operation batches
//! - `store`, `directory` - In-memory collaborators
//! - `clock`, `upstream` - Time source and bounded collaborator calls

pub mod balance_mutator;
pub mod batch_processor;
pub mod clock;
pub mod creation;
pub mod credit_service;
pub mod directory;
pub mod inquiry_responder;
pub mod ledger_reconstructor;
pub mod store;
pub mod traits;
pub mod upstream;
pub mod validation_engine;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use clock::{Clock, FixedClock, SystemClock};
pub use credit_service::CreditService;
pub use directory::{InMemoryAccountDirectory, InMemoryCustomerDirectory, InMemoryTransactionHistory};
pub use inquiry_responder::InquiryResponder;
pub use store::InMemoryCreditStore;
pub use traits::{AccountDirectory, CreditStore, CustomerDirectory, TransactionHistory};
pub use validation_engine::ValidationEngine;
