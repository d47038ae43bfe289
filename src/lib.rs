//! Credit Engine Library
//! # Overview
//!
//! This library manages the lifecycle of bank credit products: creation under business
//! rules, balance mutation on payments and consumptions, reconstruction of the current
//! month's daily balances, and balance-sufficiency inquiries.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (CreditRecord, CreditRequest, CreditError, etc.)
//! - [`config`] - Engine and batch configuration
//! - [`core`] - Business logic components:
//!   - [`core::validation_engine`] - Creation rules and the delinquency gate
//!   - [`core::balance_mutator`] - Balance state machine
//!   - [`core::ledger_reconstructor`] - Daily balance trail
//!   - [`core::inquiry_responder`] - Sufficiency answers
//!   - [`core::credit_service`] - Orchestration over the collaborator traits
//! - [`io`] - CSV input and output for the replay driver
//! - [`replay`] - End-to-end replay of an operations file
//! - [`cli`] - CLI arguments parsing
//!
//! # Products
//!
//! - **Personal loan** / **Business loan**: fixed amount and term, paid down in installments
//! - **Credit card**: revolving line where `available + outstanding == limit`
//! - **Debit card**: draws on the customer's bank accounts; carries no debt
//!
//! # Operations
//!
//! - **Payment**: the owner reduces the outstanding balance
//! - **Consumption**: a credit card purchase reduces the available credit
//! - **Third-party payment**: another existing customer pays toward the credit
//!
//! A credit whose outstanding balance reaches zero becomes PAID and accepts no further
//! operations.

pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod replay;
pub mod types;

pub use config::{BatchConfig, EngineConfig};
pub use core::{CreditService, InMemoryCreditStore};
pub use io::write_credits_csv;
pub use types::{
    CreditError, CreditId, CreditOperation, CreditRecord, CreditRequest, CreditStatus, CreditType,
    CustomerId,
};
