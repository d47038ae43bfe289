//! Balance mutation for payments, consumptions and third-party payments
//!
//! This module applies one [`CreditOperation`] to a [`CreditRecord`] and returns the
//! resulting record.
//!
//! The functions never touch the record they are given: every check runs first and the
//! new state is computed on a copy, so a rejected operation leaves nothing half-applied.
//! All balance arithmetic is checked; an overflow surfaces as an error instead of
//! wrapping or saturating.
//!
//! State machine: every operation requires an ACTIVE record. A payment that brings the
//! outstanding balance to zero moves the record to PAID, which no operation leaves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{CreditError, CreditOperation, CreditRecord, CreditStatus, ProductTerms};

/// Apply an operation to a record
///
/// The payer of a third-party payment must already have been confirmed to exist; this
/// function only performs the balance change.
///
/// # Arguments
///
/// * `record` - Current state of the credit
/// * `operation` - Operation to apply
/// * `now` - Timestamp written to `updated_at`
///
/// # Returns
///
/// The new record state. The version is left as read; the store bumps it on save.
///
/// # Errors
///
/// * `InvalidState` if the record is not ACTIVE
/// * `Validation` if the amount is not positive or exceeds what the record allows
/// * `ArithmeticOverflow` / `ArithmeticUnderflow` if checked arithmetic fails
pub fn apply(
    record: &CreditRecord,
    operation: &CreditOperation,
    now: DateTime<Utc>,
) -> Result<CreditRecord, CreditError> {
    let mut next = match operation {
        CreditOperation::Payment { amount } => apply_payment(record, *amount)?,
        CreditOperation::Consumption { amount, .. } => apply_consumption(record, *amount)?,
        CreditOperation::ThirdPartyPayment { amount, .. } => {
            apply_third_party_payment(record, *amount)?
        }
    };
    next.updated_at = now;
    Ok(next)
}

fn require_active(record: &CreditRecord, operation: &str) -> Result<(), CreditError> {
    if record.is_active() {
        Ok(())
    } else {
        Err(CreditError::invalid_state(&record.id, record.status, operation))
    }
}

fn require_positive(amount: Decimal, what: &str) -> Result<(), CreditError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(CreditError::validation(format!(
            "{} amount must be greater than 0",
            what
        )))
    }
}

fn require_within_outstanding(record: &CreditRecord, amount: Decimal) -> Result<(), CreditError> {
    if amount > record.outstanding_balance {
        Err(CreditError::validation(format!(
            "Payment amount ({:.2}) exceeds outstanding balance ({:.2})",
            amount, record.outstanding_balance
        )))
    } else {
        Ok(())
    }
}

/// Reduce the debt and give the amount back to a card's available credit
///
/// Shared by both payment kinds; the caller handles the loan installment counter.
fn reduce_debt(
    record: &CreditRecord,
    amount: Decimal,
    operation: &str,
) -> Result<CreditRecord, CreditError> {
    let mut next = record.clone();

    next.outstanding_balance = record
        .outstanding_balance
        .checked_sub(amount)
        .ok_or_else(|| CreditError::arithmetic_underflow(operation, &record.id))?;

    if let ProductTerms::CreditCard(card) = &mut next.terms {
        card.available_credit = card
            .available_credit
            .checked_add(amount)
            .ok_or_else(|| CreditError::arithmetic_overflow(operation, &record.id))?;
    }

    if next.outstanding_balance <= Decimal::ZERO {
        next.status = CreditStatus::Paid;
    }

    Ok(next)
}

/// Owner payment
///
/// Loans consume one installment per payment. The installment counter stops at zero, so
/// payments beyond the scheduled term still reduce the debt.
pub fn apply_payment(record: &CreditRecord, amount: Decimal) -> Result<CreditRecord, CreditError> {
    const OPERATION: &str = "payment";

    require_active(record, OPERATION)?;
    require_positive(amount, "Payment")?;
    require_within_outstanding(record, amount)?;

    let mut next = reduce_debt(record, amount, OPERATION)?;

    if let ProductTerms::PersonalLoan(loan) | ProductTerms::BusinessLoan(loan) = &mut next.terms {
        loan.remaining_payments = loan.remaining_payments.saturating_sub(1);
    }

    Ok(next)
}

/// Card purchase
///
/// Only credit cards accept consumptions, and never beyond the available credit.
pub fn apply_consumption(
    record: &CreditRecord,
    amount: Decimal,
) -> Result<CreditRecord, CreditError> {
    const OPERATION: &str = "consumption";

    let ProductTerms::CreditCard(card) = &record.terms else {
        return Err(CreditError::validation(
            "Consumption can only be charged to credit cards",
        ));
    };
    require_active(record, OPERATION)?;
    require_positive(amount, "Consumption")?;
    if amount > card.available_credit {
        return Err(CreditError::validation(format!(
            "Consumption amount ({:.2}) exceeds available credit ({:.2})",
            amount, card.available_credit
        )));
    }

    let mut next = record.clone();
    next.outstanding_balance = record
        .outstanding_balance
        .checked_add(amount)
        .ok_or_else(|| CreditError::arithmetic_overflow(OPERATION, &record.id))?;
    if let ProductTerms::CreditCard(card) = &mut next.terms {
        card.available_credit = card
            .available_credit
            .checked_sub(amount)
            .ok_or_else(|| CreditError::arithmetic_underflow(OPERATION, &record.id))?;
    }

    Ok(next)
}

/// Payment made by another customer
///
/// Same balance effect as [`apply_payment`]. For loans, a full payoff zeroes the
/// installment counter; otherwise the counter drops by one only while it is positive.
pub fn apply_third_party_payment(
    record: &CreditRecord,
    amount: Decimal,
) -> Result<CreditRecord, CreditError> {
    const OPERATION: &str = "third_party_payment";

    require_active(record, OPERATION)?;
    require_positive(amount, "Payment")?;
    require_within_outstanding(record, amount)?;

    let mut next = reduce_debt(record, amount, OPERATION)?;
    let paid_off = next.status == CreditStatus::Paid;

    if let ProductTerms::PersonalLoan(loan) | ProductTerms::BusinessLoan(loan) = &mut next.terms {
        if paid_off {
            loan.remaining_payments = 0;
        } else if loan.remaining_payments > 0 {
            loan.remaining_payments -= 1;
        }
    }

    Ok(next)
}
