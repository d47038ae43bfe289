//! In-memory customer directory, account directory and transaction history
//!
//! These back the replay driver and the tests. They are loaded up front and answer
//! lookups from `DashMap`s, so they never fail on their own.

use async_trait::async_trait;
use dashmap::DashMap;

use super::traits::{AccountDirectory, CustomerDirectory, TransactionHistory};
use crate::types::{AccountInfo, CreditError, CustomerId, CustomerType, HistoryTransaction};

/// Customer segments by customer id
#[derive(Debug, Default)]
pub struct InMemoryCustomerDirectory {
    customers: DashMap<CustomerId, CustomerType>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
        }
    }

    /// Register or replace a customer
    pub fn insert(&self, customer_id: impl Into<String>, customer_type: CustomerType) {
        self.customers.insert(customer_id.into(), customer_type);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn customer_type(&self, customer_id: &str) -> Result<Option<CustomerType>, CreditError> {
        Ok(self
            .customers
            .get(customer_id)
            .map(|entry| entry.value().clone()))
    }

    async fn customer_exists(&self, customer_id: &str) -> Result<bool, CreditError> {
        Ok(self.customers.contains_key(customer_id))
    }
}

/// Accounts by account id
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: DashMap<String, AccountInfo>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Register or replace an account
    pub fn insert(&self, account: AccountInfo) {
        self.accounts.insert(account.id.clone(), account);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn get_account(&self, account_id: &str) -> Result<Option<AccountInfo>, CreditError> {
        Ok(self
            .accounts
            .get(account_id)
            .map(|entry| entry.value().clone()))
    }
}

/// Posted transactions by product id
///
/// The product type argument of the lookup is accepted but not used as a key; product ids
/// are unique across types.
#[derive(Debug, Default)]
pub struct InMemoryTransactionHistory {
    transactions: DashMap<String, Vec<HistoryTransaction>>,
}

impl InMemoryTransactionHistory {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    /// Append a transaction to a product's history
    pub fn record(&self, product_id: impl Into<String>, transaction: HistoryTransaction) {
        self.transactions
            .entry(product_id.into())
            .or_default()
            .push(transaction);
    }
}

#[async_trait]
impl TransactionHistory for InMemoryTransactionHistory {
    async fn list_for_product_current_month(
        &self,
        product_id: &str,
        _product_type: &str,
    ) -> Result<Vec<HistoryTransaction>, CreditError> {
        Ok(self
            .transactions
            .get(product_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountStatus;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_customer_directory_lookup() {
        let directory = InMemoryCustomerDirectory::new();
        directory.insert("u1", CustomerType::PersonalVip);

        assert_eq!(
            directory.customer_type("u1").await.unwrap(),
            Some(CustomerType::PersonalVip)
        );
        assert!(directory.customer_exists("u1").await.unwrap());
        assert_eq!(directory.customer_type("u2").await.unwrap(), None);
        assert!(!directory.customer_exists("u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_account_directory_lookup() {
        let directory = InMemoryAccountDirectory::new();
        directory.insert(AccountInfo {
            id: "acc-1".to_string(),
            account_number: "191-000001".to_string(),
            account_type: "SAVINGS".to_string(),
            customer_id: "u1".to_string(),
            balance: Decimal::new(250, 0),
            status: AccountStatus::Active,
        });

        let account = directory.get_account("acc-1").await.unwrap().unwrap();
        assert_eq!(account.balance, Decimal::new(250, 0));
        assert!(directory.get_account("acc-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_appends_in_order() {
        let history = InMemoryTransactionHistory::new();
        history.record("c1", HistoryTransaction::new("PAYMENT", Decimal::ONE, "2024-03-02"));
        history.record("c1", HistoryTransaction::new("CHARGE", Decimal::TWO, "2024-03-03"));

        let listed = history
            .list_for_product_current_month("c1", "CREDIT")
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].transaction_type, "CHARGE");
        assert!(history
            .list_for_product_current_month("c2", "CREDIT")
            .await
            .unwrap()
            .is_empty());
    }
}
