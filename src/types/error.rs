//! Error types for the credit engine
//!
//! This module defines every error the engine can surface. The variants follow the
//! engine's failure taxonomy so callers can decide what to do without parsing messages.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: referenced credit, customer or account is absent
//! - **Business Errors**: validation rule violations, operations on non-active records
//! - **Concurrency Errors**: optimistic version collisions on save (retryable by the caller)
//! - **Upstream Errors**: a collaborator failed or timed out
//! - **Arithmetic Errors**: checked balance or counter arithmetic failed
//! - **Replay I/O Errors**: file and CSV problems in the replay driver

use super::credit::CreditStatus;
use thiserror::Error;

/// Main error type for the credit engine
///
/// Each variant carries enough context to log a useful line without the caller
/// re-reading the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreditError {
    /// A referenced credit, customer or account does not exist
    ///
    /// Surfaced to the caller, never retried.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up ("Credit", "Customer", ...)
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// A business rule rejected the request
    #[error("Validation failed: {reason}")]
    Validation {
        /// Human-readable description of the violated rule
        reason: String,
    },

    /// An operation was attempted against a record that is not ACTIVE
    #[error("Cannot apply {operation} to credit {credit_id} in status {status}")]
    InvalidState {
        /// Credit the operation targeted
        credit_id: String,
        /// Status the credit was in
        status: CreditStatus,
        /// Operation that was rejected
        operation: String,
    },

    /// The record changed between read and write
    ///
    /// The caller should reload and retry the whole read-modify-write cycle.
    #[error("Version conflict on credit {credit_id}: expected version {expected:?}, found {actual:?}")]
    Conflict {
        /// Credit whose save was rejected
        credit_id: String,
        /// Version the writer read (`None` for an insert)
        expected: Option<u64>,
        /// Version currently stored (`None` if the record is gone)
        actual: Option<u64>,
    },

    /// A collaborator call failed or did not answer in time
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        /// Collaborator that failed
        service: String,
        /// Failure description
        message: String,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for credit {credit_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Credit being mutated
        credit_id: String,
    },

    /// Arithmetic underflow would occur
    #[error("Arithmetic underflow in {operation} for credit {credit_id}")]
    ArithmeticUnderflow {
        /// Operation that would underflow
        operation: String,
        /// Credit being mutated
        credit_id: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for CreditError {
    fn from(error: std::io::Error) -> Self {
        CreditError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CreditError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CreditError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CreditError {
    /// Create a NotFound error for any entity kind
    pub fn not_found(entity: &str, id: &str) -> Self {
        CreditError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create a NotFound error for a credit
    pub fn credit_not_found(id: &str) -> Self {
        Self::not_found("Credit", id)
    }

    /// Create a NotFound error for a customer
    pub fn customer_not_found(id: &str) -> Self {
        Self::not_found("Customer", id)
    }

    /// Create a Validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        CreditError::Validation {
            reason: reason.into(),
        }
    }

    /// Create an InvalidState error
    pub fn invalid_state(credit_id: &str, status: CreditStatus, operation: &str) -> Self {
        CreditError::InvalidState {
            credit_id: credit_id.to_string(),
            status,
            operation: operation.to_string(),
        }
    }

    /// Create a Conflict error
    pub fn conflict(credit_id: &str, expected: Option<u64>, actual: Option<u64>) -> Self {
        CreditError::Conflict {
            credit_id: credit_id.to_string(),
            expected,
            actual,
        }
    }

    /// Create an UpstreamUnavailable error
    pub fn upstream_unavailable(service: &str, message: impl Into<String>) -> Self {
        CreditError::UpstreamUnavailable {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, credit_id: &str) -> Self {
        CreditError::ArithmeticOverflow {
            operation: operation.to_string(),
            credit_id: credit_id.to_string(),
        }
    }

    /// Create an ArithmeticUnderflow error
    pub fn arithmetic_underflow(operation: &str, credit_id: &str) -> Self {
        CreditError::ArithmeticUnderflow {
            operation: operation.to_string(),
            credit_id: credit_id.to_string(),
        }
    }

    /// Whether the caller may retry the failed read-modify-write cycle
    ///
    /// Only version conflicts are transient; everything else is a definitive answer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CreditError::Conflict { .. })
    }
}
