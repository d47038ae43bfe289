//! Transaction history and daily balance types
//!
//! Balances here use the ledger sign convention: a debt of 200 is reported as `-200`.

use super::credit::{CreditId, CreditType, CustomerId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry returned by the transaction history collaborator
///
/// The date is kept as the raw string the history service produced; only its first
/// ten characters (`YYYY-MM-DD`) are meaningful to the reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTransaction {
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Decimal,
    pub date: Option<String>,
}

impl HistoryTransaction {
    pub fn new(transaction_type: impl Into<String>, amount: Decimal, date: &str) -> Self {
        HistoryTransaction {
            transaction_type: transaction_type.into(),
            amount,
            date: Some(date.to_string()),
        }
    }

    /// Calendar date of the transaction, if the date string carries one
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Effect of this transaction on the signed balance
    pub fn effect(&self) -> LedgerEffect {
        LedgerEffect::classify(&self.transaction_type)
    }
}

/// How a history entry moves the signed balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEffect {
    /// Reduces the debt
    Payment,
    /// Increases the debt
    Consumption,
    /// Counted, but leaves the balance alone
    Neutral,
}

impl LedgerEffect {
    /// Classify a transaction type name, case-insensitively
    pub fn classify(transaction_type: &str) -> Self {
        match transaction_type.trim().to_uppercase().as_str() {
            "CREDIT_PAYMENT" | "PAYMENT" | "THIRD_PARTY_PAYMENT" => LedgerEffect::Payment,
            "CARD_CONSUMPTION" | "CONSUMPTION" | "CHARGE" => LedgerEffect::Consumption,
            _ => LedgerEffect::Neutral,
        }
    }
}

/// End-of-day balance of one credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub balance: Decimal,
    pub transactions_count: usize,
}

/// Result of a reconstruction: the trail in ascending date order and its mean
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceTrail {
    pub daily_balances: Vec<DailyBalance>,
    pub daily_average: Decimal,
}

/// Current-month balance view of one credit, as served per customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDailyBalance {
    pub id: CreditId,
    pub credit_number: String,
    pub credit_type: CreditType,
    pub customer_id: CustomerId,
    pub current_balance: Decimal,
    pub daily_average: Decimal,
    pub daily_balances: Vec<DailyBalance>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CREDIT_PAYMENT", LedgerEffect::Payment)]
    #[case("payment", LedgerEffect::Payment)]
    #[case("Third_Party_Payment", LedgerEffect::Payment)]
    #[case("CARD_CONSUMPTION", LedgerEffect::Consumption)]
    #[case("consumption", LedgerEffect::Consumption)]
    #[case("CHARGE", LedgerEffect::Consumption)]
    #[case("FEE_WAIVER", LedgerEffect::Neutral)]
    #[case("", LedgerEffect::Neutral)]
    fn test_classify(#[case] name: &str, #[case] expected: LedgerEffect) {
        assert_eq!(LedgerEffect::classify(name), expected);
    }

    #[rstest]
    #[case(Some("2024-03-15"), NaiveDate::from_ymd_opt(2024, 3, 15))]
    #[case(Some("2024-03-15T10:22:01.000Z"), NaiveDate::from_ymd_opt(2024, 3, 15))]
    #[case(Some("2024-3-15"), None)]
    #[case(Some("yesterday"), None)]
    #[case(None, None)]
    fn test_calendar_date(#[case] raw: Option<&str>, #[case] expected: Option<NaiveDate>) {
        let tx = HistoryTransaction {
            transaction_type: "PAYMENT".to_string(),
            amount: Decimal::ONE,
            date: raw.map(str::to_string),
        };
        assert_eq!(tx.calendar_date(), expected);
    }
}
