//! Request types accepted by the engine
//!
//! A [`CreditRequest`] arrives as a flat bag of optional fields, exactly as a caller
//! would submit it. The validation engine inspects the raw shape (a loan carrying a
//! credit limit must be *rejected*, not silently dropped) and, once every rule passes,
//! wraps it in a [`ValidatedRequest`] that only the engine can construct.

use super::credit::{CardBrand, CreditType, CustomerId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Associated account as submitted on debit card creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedAccountRequest {
    pub account_id: String,
    pub sequence_order: u32,
}

/// Creation or administrative update request for a credit product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    pub credit_number: String,
    pub credit_type: CreditType,
    pub customer_id: CustomerId,
    pub amount: Option<Decimal>,
    pub interest_rate: Decimal,
    pub credit_limit: Option<Decimal>,
    pub term_months: Option<u32>,
    pub monthly_payment: Option<Decimal>,
    pub due_date: NaiveDate,
    pub main_account_id: Option<String>,
    #[serde(default)]
    pub associated_accounts: Vec<AssociatedAccountRequest>,
    pub daily_withdrawal_limit: Option<Decimal>,
    pub daily_purchase_limit: Option<Decimal>,
    pub card_brand: Option<CardBrand>,
}

impl CreditRequest {
    /// Minimal request for the given product; optional fields start empty
    pub fn new(
        credit_number: impl Into<String>,
        credit_type: CreditType,
        customer_id: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        CreditRequest {
            credit_number: credit_number.into(),
            credit_type,
            customer_id: customer_id.into(),
            amount: None,
            interest_rate: Decimal::ZERO,
            credit_limit: None,
            term_months: None,
            monthly_payment: None,
            due_date,
            main_account_id: None,
            associated_accounts: Vec::new(),
            daily_withdrawal_limit: None,
            daily_purchase_limit: None,
            card_brand: None,
        }
    }
}

/// A creation request that passed every business rule
///
/// Construction is restricted to the crate so that holding one proves validation ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest(CreditRequest);

impl ValidatedRequest {
    pub(crate) fn new(request: CreditRequest) -> Self {
        ValidatedRequest(request)
    }

    /// Borrow the underlying request
    pub fn request(&self) -> &CreditRequest {
        &self.0
    }

    /// Unwrap into the underlying request
    pub fn into_inner(self) -> CreditRequest {
        self.0
    }
}

/// Balance operation applied to an existing credit
#[derive(Debug, Clone, PartialEq)]
pub enum CreditOperation {
    /// Owner pays down the debt
    Payment { amount: Decimal },
    /// Card purchase at a merchant
    Consumption { amount: Decimal, merchant: String },
    /// Another customer pays toward this credit
    ThirdPartyPayment {
        amount: Decimal,
        payer_customer_id: CustomerId,
    },
}

impl CreditOperation {
    /// Short operation name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            CreditOperation::Payment { .. } => "payment",
            CreditOperation::Consumption { .. } => "consumption",
            CreditOperation::ThirdPartyPayment { .. } => "third_party_payment",
        }
    }

    /// Amount moved by the operation
    pub fn amount(&self) -> Decimal {
        match self {
            CreditOperation::Payment { amount }
            | CreditOperation::Consumption { amount, .. }
            | CreditOperation::ThirdPartyPayment { amount, .. } => *amount,
        }
    }
}
