//! Types module
//!
//! Contains the data structures shared by the engine, the collaborators and the replay driver:
//! - `credit`: the persisted credit record and its product variants
//! - `request`: creation requests and balance operations
//! - `directory`: customer and account data returned by the directories
//! - `ledger`: transaction history entries and daily balances
//! - `inquiry`: balance-sufficiency inquiry messages
//! - `summary`: read-only balance summaries
//! - `replay`: operations file rows for the replay driver
//! - `error`: error types for the credit engine

pub mod credit;
pub mod directory;
pub mod error;
pub mod inquiry;
pub mod ledger;
pub mod replay;
pub mod request;
pub mod summary;

pub use credit::{
    AssociatedAccount, CardBrand, CardStatus, CardTerms, CreditId, CreditRecord, CreditStatus,
    CreditType, CustomerId, DebitCardTerms, LoanTerms, ProductTerms,
};
pub use directory::{AccountInfo, AccountStatus, CustomerType};
pub use error::CreditError;
pub use inquiry::{BalanceInquiry, BalanceInquiryResponse, ValidationResult};
pub use ledger::{BalanceTrail, CreditDailyBalance, DailyBalance, HistoryTransaction, LedgerEffect};
pub use replay::{OperationRecord, ReplayOperation};
pub use request::{AssociatedAccountRequest, CreditOperation, CreditRequest, ValidatedRequest};
pub use summary::{CreditBalance, DebitCardBalance};
