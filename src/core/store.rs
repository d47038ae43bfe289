//! In-memory credit store with optimistic concurrency
//!
//! This module provides `InMemoryCreditStore`, a [`CreditStore`] backed by `DashMap`.
//!
//! # Design
//!
//! Each record carries a `version`. A save names the version it read; the store compares
//! it with the stored version and either replaces the record (bumping the version) or
//! rejects the write with `Conflict`. The compare and the replace happen under the
//! DashMap shard lock of that one entry, so two writers of the same credit can never both
//! succeed from the same read.
//!
//! # Thread Safety
//!
//! Reads and writes of different credits proceed in parallel through DashMap's internal
//! sharding. No lock is held once a method returns.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use super::traits::CreditStore;
use crate::types::{CreditError, CreditId, CreditRecord, CreditStatus, CreditType};

/// Thread-safe credit record storage
#[derive(Debug, Default)]
pub struct InMemoryCreditStore {
    /// Records by credit id
    credits: DashMap<CreditId, CreditRecord>,
}

impl InMemoryCreditStore {
    pub fn new() -> Self {
        Self {
            credits: DashMap::new(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.credits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }

    /// Insert a record that does not exist yet, storing it at version 1
    fn insert_new(&self, mut record: CreditRecord) -> Result<CreditRecord, CreditError> {
        record.version = 1;
        let mut inserted = false;
        let stored = self
            .credits
            .entry(record.id.clone())
            .or_insert_with(|| {
                inserted = true;
                record.clone()
            });

        if inserted {
            Ok(record)
        } else {
            Err(CreditError::conflict(&record.id, None, Some(stored.version)))
        }
    }

    /// Replace a record only if its stored version still equals `expected`
    fn compare_and_swap(
        &self,
        mut record: CreditRecord,
        expected: u64,
    ) -> Result<CreditRecord, CreditError> {
        let mut stored = self
            .credits
            .get_mut(&record.id)
            .ok_or_else(|| CreditError::conflict(&record.id, Some(expected), None))?;

        if stored.version != expected {
            return Err(CreditError::conflict(
                &record.id,
                Some(expected),
                Some(stored.version),
            ));
        }

        record.version = expected
            .checked_add(1)
            .ok_or_else(|| CreditError::arithmetic_overflow("version bump", &record.id))?;
        *stored = record.clone();
        Ok(record)
    }
}

#[async_trait]
impl CreditStore for InMemoryCreditStore {
    async fn get(&self, id: &str) -> Result<Option<CreditRecord>, CreditError> {
        Ok(self.credits.get(id).map(|entry| entry.value().clone()))
    }

    async fn save(
        &self,
        record: CreditRecord,
        expected_version: Option<u64>,
    ) -> Result<CreditRecord, CreditError> {
        match expected_version {
            None => self.insert_new(record),
            Some(expected) => self.compare_and_swap(record, expected),
        }
    }

    async fn query_by_customer(
        &self,
        customer_id: &str,
        credit_type: Option<CreditType>,
    ) -> Result<Vec<CreditRecord>, CreditError> {
        let mut records: Vec<CreditRecord> = self
            .credits
            .iter()
            .filter(|entry| entry.customer_id == customer_id)
            .filter(|entry| credit_type.is_none_or(|wanted| entry.credit_type() == wanted))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.credit_number.cmp(&b.credit_number));
        Ok(records)
    }

    async fn query_active_overdue(
        &self,
        customer_id: &str,
        as_of: NaiveDate,
    ) -> Result<bool, CreditError> {
        Ok(self.credits.iter().any(|entry| {
            entry.customer_id == customer_id
                && entry.status == CreditStatus::Active
                && entry.due_date < as_of
        }))
    }

    async fn list_all(&self) -> Result<Vec<CreditRecord>, CreditError> {
        let mut records: Vec<CreditRecord> = self
            .credits
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.credit_number.cmp(&b.credit_number));
        Ok(records)
    }
}
