//! Answers balance-sufficiency inquiries from other subsystems
//!
//! An inquiry asks whether a credit can cover an amount. The answer is data, not an error:
//! an unknown credit or a blocked card is reported as an invalid result with a reason.
//! Only a failing collaborator surfaces as an error, since no honest answer exists then.
//!
//! Nothing here writes to the store.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use super::traits::{AccountDirectory, CreditStore};
use super::upstream::bounded;
use crate::types::{
    BalanceInquiry, BalanceInquiryResponse, CreditError, CreditRecord, ProductTerms,
    ValidationResult,
};

/// Read-only sufficiency checks against stored credits
#[derive(Clone)]
pub struct InquiryResponder {
    store: Arc<dyn CreditStore>,
    accounts: Arc<dyn AccountDirectory>,
    upstream_timeout: Duration,
}

impl InquiryResponder {
    pub fn new(
        store: Arc<dyn CreditStore>,
        accounts: Arc<dyn AccountDirectory>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            store,
            accounts,
            upstream_timeout,
        }
    }

    /// Whether `credit_id` can cover `required_amount`
    ///
    /// # Returns
    ///
    /// * credit absent or not ACTIVE: invalid with available balance 0
    /// * credit card: available balance is the available credit
    /// * debit card: available balance is the main account balance
    /// * loan: available balance is 0, valid only for a non-positive requirement
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the store or the account directory fails.
    pub async fn check(
        &self,
        credit_id: &str,
        required_amount: Decimal,
    ) -> Result<ValidationResult, CreditError> {
        let record = bounded(
            "credit store",
            self.upstream_timeout,
            self.store.get(credit_id),
        )
        .await?;

        let Some(record) = record else {
            return Ok(ValidationResult::invalid("credit not found", Decimal::ZERO));
        };

        if !record.is_active() {
            return Ok(ValidationResult::invalid(
                format!("credit is {}", record.status),
                Decimal::ZERO,
            ));
        }

        let available = match self.available_balance(&record).await? {
            Some(available) => available,
            None => {
                return Ok(ValidationResult::invalid(
                    "main account not found",
                    Decimal::ZERO,
                ))
            }
        };

        let result = if required_amount <= available {
            ValidationResult::valid(available)
        } else if record.credit_type().is_loan() {
            ValidationResult::invalid("loans have no available balance", available)
        } else {
            ValidationResult::invalid(
                format!(
                    "insufficient balance: required {:.2}, available {:.2}",
                    required_amount, available
                ),
                available,
            )
        };

        debug!(
            credit_id,
            %required_amount,
            is_valid = result.is_valid,
            "inquiry answered"
        );
        Ok(result)
    }

    /// Answer an inbound inquiry, keeping its correlation ids
    pub async fn respond(
        &self,
        inquiry: BalanceInquiry,
    ) -> Result<BalanceInquiryResponse, CreditError> {
        let result = self
            .check(&inquiry.credit_id, inquiry.required_amount)
            .await?;
        Ok(BalanceInquiryResponse::answer(inquiry, result))
    }

    /// Spendable amount of an ACTIVE credit; `None` when a debit card's main account is gone
    async fn available_balance(&self, record: &CreditRecord) -> Result<Option<Decimal>, CreditError> {
        match &record.terms {
            ProductTerms::CreditCard(card) => Ok(Some(card.available_credit)),
            ProductTerms::DebitCard(debit) => {
                let account = bounded(
                    "account directory",
                    self.upstream_timeout,
                    self.accounts.get_account(&debit.main_account_id),
                )
                .await?;
                Ok(account.map(|account| account.balance))
            }
            ProductTerms::PersonalLoan(_) | ProductTerms::BusinessLoan(_) => Ok(Some(Decimal::ZERO)),
        }
    }
}
