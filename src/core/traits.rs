//! Collaborator traits for persistence, directories and transaction history
//!
//! The credit engine never talks to a database, a customer service or an account service
//! directly. It calls these traits, shared as `Arc<dyn …>`, and the hosting application (or
//! the in-memory implementations in this crate) provides them.
//!
//! Every method is async and must not hold a lock across an await. Failures of the
//! directories and the history surface as [`CreditError::UpstreamUnavailable`].

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{
    AccountInfo, CreditError, CreditRecord, CreditType, CustomerType, HistoryTransaction,
};

/// Persistence of credit records with optimistic concurrency
#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Fetch a record by id
    async fn get(&self, id: &str) -> Result<Option<CreditRecord>, CreditError>;

    /// Save a record, comparing the stored version with `expected_version`
    ///
    /// `None` inserts a new record and fails with `Conflict` if the id is taken.
    /// `Some(v)` replaces the record only if its stored version is still `v`.
    /// On success the stored version is incremented and the saved record is returned.
    async fn save(
        &self,
        record: CreditRecord,
        expected_version: Option<u64>,
    ) -> Result<CreditRecord, CreditError>;

    /// Records of a customer, optionally restricted to one product type
    async fn query_by_customer(
        &self,
        customer_id: &str,
        credit_type: Option<CreditType>,
    ) -> Result<Vec<CreditRecord>, CreditError>;

    /// Whether the customer holds an ACTIVE record whose due date is before `as_of`
    async fn query_active_overdue(
        &self,
        customer_id: &str,
        as_of: NaiveDate,
    ) -> Result<bool, CreditError>;

    /// Every stored record
    async fn list_all(&self) -> Result<Vec<CreditRecord>, CreditError>;
}

/// Customer master data
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Segment of the customer, `None` when the customer is unknown
    async fn customer_type(&self, customer_id: &str) -> Result<Option<CustomerType>, CreditError>;

    async fn customer_exists(&self, customer_id: &str) -> Result<bool, CreditError>;
}

/// Bank account master data
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn get_account(&self, account_id: &str) -> Result<Option<AccountInfo>, CreditError>;
}

/// Posted transactions of a product
#[async_trait]
pub trait TransactionHistory: Send + Sync {
    /// Transactions of the current calendar month for a product
    async fn list_for_product_current_month(
        &self,
        product_id: &str,
        product_type: &str,
    ) -> Result<Vec<HistoryTransaction>, CreditError>;
}
