//! Credit record types for the credit engine
//!
//! This module defines the persisted state of one credit product and the closed set of
//! product variants. Each variant of [`ProductTerms`] carries exactly the fields its
//! product type owns, so a loan can never hold a credit limit and a debit card can never
//! hold loan fields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Credit identifier
///
/// Opaque and stable; generated as a UUID v4 string at creation.
pub type CreditId = String;

/// Customer identifier as issued by the customer directory
pub type CustomerId = String;

/// Product types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
    /// Consumer loan with a fixed term
    PersonalLoan,
    /// Commercial loan with a fixed term
    BusinessLoan,
    /// Revolving credit line with a limit
    CreditCard,
    /// Card drawing on a customer's bank account
    DebitCard,
}

impl CreditType {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditType::PersonalLoan => "PERSONAL_LOAN",
            CreditType::BusinessLoan => "BUSINESS_LOAN",
            CreditType::CreditCard => "CREDIT_CARD",
            CreditType::DebitCard => "DEBIT_CARD",
        }
    }

    /// Whether this type is one of the two loan products
    pub fn is_loan(&self) -> bool {
        matches!(self, CreditType::PersonalLoan | CreditType::BusinessLoan)
    }
}

impl fmt::Display for CreditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PERSONAL_LOAN" => Ok(CreditType::PersonalLoan),
            "BUSINESS_LOAN" => Ok(CreditType::BusinessLoan),
            "CREDIT_CARD" => Ok(CreditType::CreditCard),
            "DEBIT_CARD" => Ok(CreditType::DebitCard),
            other => Err(format!("Invalid credit type: '{}'", other)),
        }
    }
}

/// Lifecycle status of a credit record
///
/// Only ACTIVE records accept balance operations. PAID is terminal within the engine;
/// DELINQUENT, INACTIVE and BLOCKED are set by processes outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Active,
    Inactive,
    Blocked,
    Paid,
    Delinquent,
}

impl CreditStatus {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::Active => "ACTIVE",
            CreditStatus::Inactive => "INACTIVE",
            CreditStatus::Blocked => "BLOCKED",
            CreditStatus::Paid => "PAID",
            CreditStatus::Delinquent => "DELINQUENT",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card network of a debit card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardBrand {
    Visa,
    Mastercard,
}

impl FromStr for CardBrand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VISA" => Ok(CardBrand::Visa),
            "MASTERCARD" => Ok(CardBrand::Mastercard),
            other => Err(format!("Invalid card brand: '{}'", other)),
        }
    }
}

/// Physical card status of a debit card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    Active,
    Inactive,
    Blocked,
    ReportedStolen,
    Expired,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardStatus::Active => "ACTIVE",
            CardStatus::Inactive => "INACTIVE",
            CardStatus::Blocked => "BLOCKED",
            CardStatus::ReportedStolen => "REPORTED_STOLEN",
            CardStatus::Expired => "EXPIRED",
        };
        f.write_str(name)
    }
}

/// Bank account linked to a debit card besides its main account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedAccount {
    pub account_id: String,
    /// Position in the fallback order; unique within a card and at least 1
    pub sequence_order: u32,
    pub associated_at: NaiveDate,
    pub status: super::directory::AccountStatus,
}

/// Fields owned by personal and business loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Principal disbursed
    pub amount: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    /// Installments left; decremented by payments
    pub remaining_payments: u32,
}

/// Fields owned by credit cards
///
/// `available_credit + outstanding_balance == credit_limit` after every engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTerms {
    pub credit_limit: Decimal,
    pub available_credit: Decimal,
}

/// Fields owned by debit cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitCardTerms {
    pub main_account_id: String,
    pub associated_accounts: Vec<AssociatedAccount>,
    pub daily_withdrawal_limit: Decimal,
    pub daily_purchase_limit: Decimal,
    pub card_brand: CardBrand,
    pub card_status: CardStatus,
    pub expiration_date: NaiveDate,
}

/// Product-specific part of a credit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "creditType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductTerms {
    PersonalLoan(LoanTerms),
    BusinessLoan(LoanTerms),
    CreditCard(CardTerms),
    DebitCard(DebitCardTerms),
}

impl ProductTerms {
    /// Product type this variant represents
    pub fn credit_type(&self) -> CreditType {
        match self {
            ProductTerms::PersonalLoan(_) => CreditType::PersonalLoan,
            ProductTerms::BusinessLoan(_) => CreditType::BusinessLoan,
            ProductTerms::CreditCard(_) => CreditType::CreditCard,
            ProductTerms::DebitCard(_) => CreditType::DebitCard,
        }
    }
}

/// Persisted state of one credit product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRecord {
    pub id: CreditId,

    /// Customer-facing number, 10 to 20 characters
    pub credit_number: String,

    pub customer_id: CustomerId,

    /// Debt magnitude owed; never negative
    pub outstanding_balance: Decimal,

    /// Annual rate in percent, 0 to 100
    pub interest_rate: Decimal,

    pub status: CreditStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub due_date: NaiveDate,

    /// Optimistic concurrency counter, incremented by the store on every save
    pub version: u64,

    pub terms: ProductTerms,
}

impl CreditRecord {
    /// Product type of this record
    pub fn credit_type(&self) -> CreditType {
        self.terms.credit_type()
    }

    /// Whether balance operations are currently allowed
    pub fn is_active(&self) -> bool {
        self.status == CreditStatus::Active
    }

    /// Unused credit-card headroom; zero for every other product
    pub fn available_credit(&self) -> Decimal {
        match &self.terms {
            ProductTerms::CreditCard(card) => card.available_credit,
            _ => Decimal::ZERO,
        }
    }

    /// Current balance in ledger convention (negative means debt)
    pub fn signed_balance(&self) -> Decimal {
        -self.outstanding_balance
    }

    /// Loan fields, if this record is a loan
    pub fn loan_terms(&self) -> Option<&LoanTerms> {
        match &self.terms {
            ProductTerms::PersonalLoan(loan) | ProductTerms::BusinessLoan(loan) => Some(loan),
            _ => None,
        }
    }

    /// Debit card fields, if this record is a debit card
    pub fn debit_card_terms(&self) -> Option<&DebitCardTerms> {
        match &self.terms {
            ProductTerms::DebitCard(debit) => Some(debit),
            _ => None,
        }
    }

    /// Installments left for loans
    pub fn remaining_payments(&self) -> Option<u32> {
        self.loan_terms().map(|loan| loan.remaining_payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PERSONAL_LOAN", CreditType::PersonalLoan)]
    #[case("business_loan", CreditType::BusinessLoan)]
    #[case(" Credit_Card ", CreditType::CreditCard)]
    #[case("DEBIT_CARD", CreditType::DebitCard)]
    fn test_credit_type_parsing(#[case] input: &str, #[case] expected: CreditType) {
        assert_eq!(input.parse::<CreditType>().unwrap(), expected);
        assert_eq!(expected.to_string(), expected.as_str());
    }

    #[test]
    fn test_credit_type_rejects_unknown() {
        assert!("MORTGAGE".parse::<CreditType>().is_err());
    }

    #[test]
    fn test_terms_report_their_type() {
        let card = ProductTerms::CreditCard(CardTerms {
            credit_limit: Decimal::new(5000, 0),
            available_credit: Decimal::new(4000, 0),
        });
        assert_eq!(card.credit_type(), CreditType::CreditCard);
        assert!(!card.credit_type().is_loan());
        assert!(CreditType::BusinessLoan.is_loan());
    }

    #[test]
    fn test_credit_type_serializes_upper_snake() {
        let json = serde_json::to_string(&CreditType::PersonalLoan).unwrap();
        assert_eq!(json, "\"PERSONAL_LOAN\"");
        let status = serde_json::to_string(&CreditStatus::Delinquent).unwrap();
        assert_eq!(status, "\"DELINQUENT\"");
    }
}
