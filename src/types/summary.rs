//! Read-only balance summaries served by the credit service

use super::credit::{CardStatus, CreditId, CreditType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance summary of one credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub credit_id: CreditId,
    pub credit_number: String,
    pub credit_type: CreditType,
    pub outstanding_balance: Decimal,
    pub available_credit: Decimal,
    pub minimum_payment: Decimal,
    pub due_date: NaiveDate,
    pub currency: String,
}

/// Main-account balance behind a debit card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitCardBalance {
    pub card_id: CreditId,
    pub card_number: String,
    pub card_status: CardStatus,
    pub main_account_id: String,
    pub account_number: String,
    pub account_type: String,
    pub current_balance: Decimal,
    /// Same figure as `current_balance`; holds are not tracked by the account directory
    pub available_balance: Decimal,
    pub currency: String,
    pub last_updated: DateTime<Utc>,
}
