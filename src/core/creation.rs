//! Initial state of a newly created credit
//!
//! Only a [`ValidatedRequest`] can be turned into a record, so every record entering the
//! store went through the validation engine first.

use chrono::Months;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::clock::Clock;
use crate::config::EngineConfig;
use crate::types::{
    AccountStatus, AssociatedAccount, CardStatus, CardTerms, CreditError, CreditRecord,
    CreditStatus, CreditType, DebitCardTerms, LoanTerms, ProductTerms, ValidatedRequest,
};

/// Build the first version of a credit record from a validated request
///
/// Balances are initialized per product type:
/// - credit cards start with no debt and the whole limit available
/// - debit cards carry no debt, no rate and an INACTIVE card valid for the configured years
/// - loans start owing the full principal with one remaining payment per month of term
///
/// # Errors
///
/// Returns `Validation` if a field the rules guarantee is missing, and
/// `ArithmeticOverflow` if the card expiry date is out of range.
pub fn initialize_record(
    validated: ValidatedRequest,
    clock: &dyn Clock,
    config: &EngineConfig,
) -> Result<CreditRecord, CreditError> {
    let request = validated.into_inner();
    let id = Uuid::new_v4().to_string();
    let now = clock.now();
    let today = clock.today();

    let missing = |field: &str| {
        CreditError::validation(format!(
            "{} requires {}",
            request.credit_type, field
        ))
    };

    let (terms, outstanding_balance, interest_rate) = match request.credit_type {
        CreditType::CreditCard => {
            let credit_limit = request.credit_limit.ok_or_else(|| missing("a credit limit"))?;
            let terms = ProductTerms::CreditCard(CardTerms {
                credit_limit,
                available_credit: credit_limit,
            });
            (terms, Decimal::ZERO, request.interest_rate)
        }
        CreditType::DebitCard => {
            let expiration_date = today
                .checked_add_months(Months::new(config.debit_card_validity_years * 12))
                .ok_or_else(|| CreditError::arithmetic_overflow("card expiry", &id))?;
            let associated_accounts = request
                .associated_accounts
                .iter()
                .map(|account| AssociatedAccount {
                    account_id: account.account_id.clone(),
                    sequence_order: account.sequence_order,
                    associated_at: today,
                    status: AccountStatus::Active,
                })
                .collect();
            let terms = ProductTerms::DebitCard(DebitCardTerms {
                main_account_id: request
                    .main_account_id
                    .clone()
                    .ok_or_else(|| missing("a main account"))?,
                associated_accounts,
                daily_withdrawal_limit: request
                    .daily_withdrawal_limit
                    .ok_or_else(|| missing("a daily withdrawal limit"))?,
                daily_purchase_limit: request
                    .daily_purchase_limit
                    .ok_or_else(|| missing("a daily purchase limit"))?,
                card_brand: request.card_brand.ok_or_else(|| missing("a card brand"))?,
                card_status: CardStatus::Inactive,
                expiration_date,
            });
            (terms, Decimal::ZERO, Decimal::ZERO)
        }
        CreditType::PersonalLoan | CreditType::BusinessLoan => {
            let amount = request.amount.ok_or_else(|| missing("an amount"))?;
            let term_months = request.term_months.ok_or_else(|| missing("a term"))?;
            let loan = LoanTerms {
                amount,
                term_months,
                monthly_payment: request.monthly_payment.unwrap_or_default(),
                remaining_payments: term_months,
            };
            let terms = if request.credit_type == CreditType::PersonalLoan {
                ProductTerms::PersonalLoan(loan)
            } else {
                ProductTerms::BusinessLoan(loan)
            };
            (terms, amount, request.interest_rate)
        }
    };

    Ok(CreditRecord {
        id,
        credit_number: request.credit_number.trim().to_string(),
        customer_id: request.customer_id,
        outstanding_balance,
        interest_rate,
        status: CreditStatus::Active,
        created_at: now,
        updated_at: now,
        due_date: request.due_date,
        version: 0,
        terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::types::{AssociatedAccountRequest, CardBrand, CreditRequest};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    #[test]
    fn test_credit_card_starts_with_full_limit() {
        let mut request = CreditRequest::new("CC-0000000001", CreditType::CreditCard, "u1", due());
        request.credit_limit = Some(Decimal::new(5000, 0));
        request.interest_rate = Decimal::new(36, 0);

        let record =
            initialize_record(ValidatedRequest::new(request), &clock(), &EngineConfig::default())
                .unwrap();

        assert_eq!(record.status, CreditStatus::Active);
        assert_eq!(record.outstanding_balance, Decimal::ZERO);
        assert_eq!(record.available_credit(), Decimal::new(5000, 0));
        assert_eq!(record.interest_rate, Decimal::new(36, 0));
        assert_eq!(record.version, 0);
        assert_eq!(record.created_at, record.updated_at);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_loan_starts_owing_principal() {
        let mut request = CreditRequest::new("LN-0000000001", CreditType::BusinessLoan, "u2", due());
        request.amount = Some(Decimal::new(12000, 0));
        request.term_months = Some(24);

        let record =
            initialize_record(ValidatedRequest::new(request), &clock(), &EngineConfig::default())
                .unwrap();

        assert_eq!(record.credit_type(), CreditType::BusinessLoan);
        assert_eq!(record.outstanding_balance, Decimal::new(12000, 0));
        assert_eq!(record.available_credit(), Decimal::ZERO);
        assert_eq!(record.remaining_payments(), Some(24));
        assert_eq!(
            record.loan_terms().map(|loan| loan.monthly_payment),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_debit_card_initialization() {
        let mut request = CreditRequest::new("DC-0000000001", CreditType::DebitCard, "u1", due());
        request.main_account_id = Some("acc-main".to_string());
        request.daily_withdrawal_limit = Some(Decimal::new(1000, 0));
        request.daily_purchase_limit = Some(Decimal::new(1500, 0));
        request.card_brand = Some(CardBrand::Mastercard);
        request.interest_rate = Decimal::new(10, 0);
        request.associated_accounts = vec![AssociatedAccountRequest {
            account_id: "acc-2".to_string(),
            sequence_order: 1,
        }];

        let record =
            initialize_record(ValidatedRequest::new(request), &clock(), &EngineConfig::default())
                .unwrap();
        let debit = record.debit_card_terms().unwrap();

        assert_eq!(record.outstanding_balance, Decimal::ZERO);
        assert_eq!(record.interest_rate, Decimal::ZERO);
        assert_eq!(debit.card_status, CardStatus::Inactive);
        assert_eq!(
            debit.expiration_date,
            NaiveDate::from_ymd_opt(2027, 3, 20).unwrap()
        );
        assert_eq!(debit.associated_accounts.len(), 1);
        assert_eq!(
            debit.associated_accounts[0].associated_at,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
        );
        assert_eq!(debit.associated_accounts[0].status, AccountStatus::Active);
    }
}
