//! Rows of an operations file, after conversion from CSV

use super::credit::CreditId;
use super::request::{CreditOperation, CreditRequest};

/// One line of an operations file
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOperation {
    /// Create a new credit
    Create(CreditRequest),
    /// Apply a balance operation to the credit with this number
    Apply {
        credit_number: String,
        operation: CreditOperation,
    },
}

impl ReplayOperation {
    /// Credit number the line refers to
    pub fn credit_number(&self) -> &str {
        match self {
            ReplayOperation::Create(request) => request.credit_number.trim(),
            ReplayOperation::Apply { credit_number, .. } => credit_number,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, ReplayOperation::Create(_))
    }
}

/// Balance operation resolved to the stored credit it targets
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub credit_id: CreditId,
    pub operation: CreditOperation,
}
