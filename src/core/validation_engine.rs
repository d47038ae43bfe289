//! Creation-time business rules
//!
//! This module provides the `ValidationEngine`, which turns a raw [`CreditRequest`] into a
//! [`ValidatedRequest`] or rejects it.
//!
//! # Design
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 0. request shape (number length, customer id, rate range, loan amount, sequence orders)
//! 1. personal customers cannot request business loans
//! 2. personal customers may hold one personal loan
//! 3. to 7. product field rules (card limit, loan term, no foreign fields per product)
//! 9. delinquency gate: no new products while an ACTIVE credit is past due
//! 8. debit card account ownership and status checks
//!
//! The shape and product rules are pure functions so they can be tested as tables. The
//! gate and the account checks need collaborators and live on the engine itself, which
//! bounds every collaborator call by the configured timeout.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::clock::Clock;
use super::traits::{AccountDirectory, CreditStore, CustomerDirectory};
use super::upstream::bounded;
use crate::types::{
    AccountInfo, AccountStatus, CreditError, CreditRequest, CreditType, CustomerType,
    ValidatedRequest,
};

const CUSTOMER_DIRECTORY: &str = "customer directory";
const ACCOUNT_DIRECTORY: &str = "account directory";
const CREDIT_STORE: &str = "credit store";

const MIN_CREDIT_NUMBER_LEN: usize = 10;
const MAX_CREDIT_NUMBER_LEN: usize = 20;

fn is_positive(value: Option<Decimal>) -> bool {
    value.is_some_and(|v| v > Decimal::ZERO)
}

/// Check the structural constraints every request must meet
///
/// Runs before any collaborator is called.
///
/// # Errors
///
/// Returns `CreditError::Validation` naming the first violated constraint.
pub fn check_request_shape(request: &CreditRequest) -> Result<(), CreditError> {
    let number_len = request.credit_number.trim().chars().count();
    if !(MIN_CREDIT_NUMBER_LEN..=MAX_CREDIT_NUMBER_LEN).contains(&number_len) {
        return Err(CreditError::validation(format!(
            "Credit number must be between {} and {} characters",
            MIN_CREDIT_NUMBER_LEN, MAX_CREDIT_NUMBER_LEN
        )));
    }

    if request.customer_id.trim().is_empty() {
        return Err(CreditError::validation("Customer id is required"));
    }

    if request.interest_rate < Decimal::ZERO || request.interest_rate > Decimal::ONE_HUNDRED {
        return Err(CreditError::validation(
            "Interest rate must be between 0 and 100",
        ));
    }

    if request.credit_type.is_loan() && !is_positive(request.amount) {
        return Err(CreditError::validation(
            "Loans must have an amount greater than 0",
        ));
    }

    if let Some(account) = request
        .associated_accounts
        .iter()
        .find(|account| account.sequence_order < 1)
    {
        return Err(CreditError::validation(format!(
            "Sequence order must be at least 1 (account {})",
            account.account_id
        )));
    }

    Ok(())
}

/// Check the customer-type and product-type rules (1 to 7)
///
/// # Arguments
///
/// * `request` - The creation request
/// * `customer_type` - Segment of the requesting customer
/// * `holds_personal_loan` - Whether the customer already holds a personal loan
///
/// # Errors
///
/// Returns `CreditError::Validation` for the first rule that fails.
pub fn check_product_rules(
    request: &CreditRequest,
    customer_type: &CustomerType,
    holds_personal_loan: bool,
) -> Result<(), CreditError> {
    let personal = customer_type.is_personal();

    if personal && request.credit_type == CreditType::BusinessLoan {
        return Err(CreditError::validation(
            "Personal customers cannot have business loans",
        ));
    }

    if personal && request.credit_type == CreditType::PersonalLoan && holds_personal_loan {
        return Err(CreditError::validation(
            "Personal customers can only have one personal loan",
        ));
    }

    check_product_fields(request)
}

/// Check the product field rules (3 to 7), which do not depend on the customer
///
/// # Errors
///
/// Returns `CreditError::Validation` for the first rule that fails.
pub fn check_product_fields(request: &CreditRequest) -> Result<(), CreditError> {
    match request.credit_type {
        CreditType::CreditCard => {
            if !is_positive(request.credit_limit) {
                return Err(CreditError::validation(
                    "Credit cards must have a credit limit greater than 0",
                ));
            }
            if request.term_months.is_some_and(|term| term > 0) {
                return Err(CreditError::validation("Credit cards cannot have term months"));
            }
            if is_positive(request.monthly_payment) {
                return Err(CreditError::validation(
                    "Credit cards cannot have monthly payment",
                ));
            }
        }
        CreditType::PersonalLoan | CreditType::BusinessLoan => {
            if !request.term_months.is_some_and(|term| term > 0) {
                return Err(CreditError::validation(
                    "Loans must have a term in months greater than 0",
                ));
            }
            if is_positive(request.credit_limit) {
                return Err(CreditError::validation("Loans cannot have credit limit"));
            }
        }
        CreditType::DebitCard => check_debit_card_fields(request)?,
    }

    Ok(())
}

/// Rule 7: required and forbidden fields of a debit card
fn check_debit_card_fields(request: &CreditRequest) -> Result<(), CreditError> {
    if request
        .main_account_id
        .as_deref()
        .is_none_or(|id| id.trim().is_empty())
    {
        return Err(CreditError::validation("Debit cards require a main account"));
    }
    if !is_positive(request.daily_withdrawal_limit) {
        return Err(CreditError::validation(
            "Debit cards require a daily withdrawal limit greater than 0",
        ));
    }
    if !is_positive(request.daily_purchase_limit) {
        return Err(CreditError::validation(
            "Debit cards require a daily purchase limit greater than 0",
        ));
    }
    if request.card_brand.is_none() {
        return Err(CreditError::validation(
            "Debit cards require a card brand (VISA or MASTERCARD)",
        ));
    }
    if is_positive(request.credit_limit) {
        return Err(CreditError::validation("Debit cards cannot have credit limit"));
    }
    if request.term_months.is_some_and(|term| term > 0) {
        return Err(CreditError::validation("Debit cards cannot have term months"));
    }
    if is_positive(request.monthly_payment) {
        return Err(CreditError::validation(
            "Debit cards cannot have monthly payment",
        ));
    }
    if is_positive(request.amount) {
        return Err(CreditError::validation(
            "Debit cards cannot have amount (use daily limits instead)",
        ));
    }
    Ok(())
}

/// Validates creation requests against the full rule set
#[derive(Clone)]
pub struct ValidationEngine {
    store: Arc<dyn CreditStore>,
    customers: Arc<dyn CustomerDirectory>,
    accounts: Arc<dyn AccountDirectory>,
    clock: Arc<dyn Clock>,
    upstream_timeout: Duration,
}

impl ValidationEngine {
    pub fn new(
        store: Arc<dyn CreditStore>,
        customers: Arc<dyn CustomerDirectory>,
        accounts: Arc<dyn AccountDirectory>,
        clock: Arc<dyn Clock>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            store,
            customers,
            accounts,
            clock,
            upstream_timeout,
        }
    }

    /// Run every rule against a creation request
    ///
    /// # Returns
    ///
    /// The request wrapped as a [`ValidatedRequest`] when all rules pass.
    ///
    /// # Errors
    ///
    /// * `Validation` - a business rule failed
    /// * `NotFound` - the customer is unknown to the customer directory
    /// * `UpstreamUnavailable` - a collaborator failed or timed out
    pub async fn validate(&self, request: CreditRequest) -> Result<ValidatedRequest, CreditError> {
        check_request_shape(&request)?;

        let customer_type = bounded(
            CUSTOMER_DIRECTORY,
            self.upstream_timeout,
            self.customers.customer_type(&request.customer_id),
        )
        .await?
        .ok_or_else(|| CreditError::customer_not_found(&request.customer_id))?;

        let holds_personal_loan = if customer_type.is_personal()
            && request.credit_type == CreditType::PersonalLoan
        {
            let existing = bounded(
                CREDIT_STORE,
                self.upstream_timeout,
                self.store
                    .query_by_customer(&request.customer_id, Some(CreditType::PersonalLoan)),
            )
            .await?;
            !existing.is_empty()
        } else {
            false
        };

        check_product_rules(&request, &customer_type, holds_personal_loan)?;
        debug!(
            customer_id = %request.customer_id,
            credit_type = %request.credit_type,
            %customer_type,
            "product rules passed"
        );

        let overdue = bounded(
            CREDIT_STORE,
            self.upstream_timeout,
            self.store
                .query_active_overdue(&request.customer_id, self.clock.today()),
        )
        .await?;
        if overdue {
            warn!(customer_id = %request.customer_id, "customer has overdue credits");
            return Err(CreditError::validation(
                "Customer has overdue credits and cannot acquire new credit products",
            ));
        }

        if request.credit_type == CreditType::DebitCard {
            self.check_debit_card_accounts(&request).await?;
            debug!(customer_id = %request.customer_id, "debit card accounts passed");
        }

        Ok(ValidatedRequest::new(request))
    }

    /// Rule 8: the main and associated accounts of a debit card
    async fn check_debit_card_accounts(&self, request: &CreditRequest) -> Result<(), CreditError> {
        let main_account_id = request.main_account_id.as_deref().unwrap_or_default();
        let main = self.fetch_account(main_account_id).await?.ok_or_else(|| {
            CreditError::validation(format!("Main account does not exist: {}", main_account_id))
        })?;
        check_account_usable("Main", &main, &request.customer_id)?;

        let mut seen_orders = HashSet::new();
        for associated in &request.associated_accounts {
            let account = self
                .fetch_account(&associated.account_id)
                .await?
                .ok_or_else(|| {
                    CreditError::validation(format!(
                        "Associated account does not exist: {}",
                        associated.account_id
                    ))
                })?;
            check_account_usable("Associated", &account, &request.customer_id)?;

            if account.id == main.id {
                return Err(CreditError::validation(
                    "Main account cannot be listed as an associated account",
                ));
            }
            if !seen_orders.insert(associated.sequence_order) {
                return Err(CreditError::validation(format!(
                    "Duplicate sequence order: {}",
                    associated.sequence_order
                )));
            }
        }

        Ok(())
    }

    async fn fetch_account(&self, account_id: &str) -> Result<Option<AccountInfo>, CreditError> {
        bounded(
            ACCOUNT_DIRECTORY,
            self.upstream_timeout,
            self.accounts.get_account(account_id),
        )
        .await
    }
}

/// An account backing a debit card must belong to the requester and be ACTIVE
fn check_account_usable(
    role: &str,
    account: &AccountInfo,
    customer_id: &str,
) -> Result<(), CreditError> {
    if account.customer_id != customer_id {
        return Err(CreditError::validation(format!(
            "{} account {} does not belong to customer {} (owner: {})",
            role, account.id, customer_id, account.customer_id
        )));
    }
    if account.status != AccountStatus::Active {
        return Err(CreditError::validation(format!(
            "{} account {} is not active (status: {})",
            role, account.id, account.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::directory::{InMemoryAccountDirectory, InMemoryCustomerDirectory};
    use crate::core::store::InMemoryCreditStore;
    use crate::types::{
        AssociatedAccountRequest, CardBrand, CardTerms, CreditRecord, CreditStatus, LoanTerms,
        ProductTerms,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    fn loan(credit_type: CreditType) -> CreditRequest {
        let mut request = CreditRequest::new("LN-0000000001", credit_type, "u1", due());
        request.amount = Some(Decimal::new(10000, 0));
        request.term_months = Some(12);
        request.interest_rate = Decimal::new(15, 0);
        request
    }

    fn credit_card() -> CreditRequest {
        let mut request = CreditRequest::new("CC-0000000001", CreditType::CreditCard, "u1", due());
        request.credit_limit = Some(Decimal::new(5000, 0));
        request
    }

    fn debit_card() -> CreditRequest {
        let mut request = CreditRequest::new("DC-0000000001", CreditType::DebitCard, "u1", due());
        request.main_account_id = Some("acc-main".to_string());
        request.daily_withdrawal_limit = Some(Decimal::new(1000, 0));
        request.daily_purchase_limit = Some(Decimal::new(2000, 0));
        request.card_brand = Some(CardBrand::Visa);
        request
    }

    #[rstest]
    #[case::short_number({ let mut r = credit_card(); r.credit_number = "CC-1".to_string(); r }, "between 10 and 20")]
    #[case::long_number({ let mut r = credit_card(); r.credit_number = "X".repeat(21); r }, "between 10 and 20")]
    #[case::blank_customer({ let mut r = credit_card(); r.customer_id = "  ".to_string(); r }, "Customer id is required")]
    #[case::negative_rate({ let mut r = credit_card(); r.interest_rate = Decimal::new(-1, 0); r }, "Interest rate")]
    #[case::rate_above_hundred({ let mut r = credit_card(); r.interest_rate = Decimal::new(1001, 1); r }, "Interest rate")]
    #[case::loan_without_amount({ let mut r = loan(CreditType::PersonalLoan); r.amount = None; r }, "amount greater than 0")]
    #[case::loan_zero_amount({ let mut r = loan(CreditType::BusinessLoan); r.amount = Some(Decimal::ZERO); r }, "amount greater than 0")]
    #[case::zero_sequence_order({
        let mut r = debit_card();
        r.associated_accounts = vec![AssociatedAccountRequest { account_id: "acc-2".to_string(), sequence_order: 0 }];
        r
    }, "Sequence order must be at least 1")]
    fn test_request_shape_rejections(#[case] request: CreditRequest, #[case] expected: &str) {
        match check_request_shape(&request) {
            Err(CreditError::Validation { reason }) => {
                assert!(reason.contains(expected), "unexpected reason: {}", reason)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[rstest]
    #[case::credit_card(credit_card())]
    #[case::personal_loan(loan(CreditType::PersonalLoan))]
    #[case::debit_card(debit_card())]
    fn test_request_shape_accepts(#[case] request: CreditRequest) {
        assert_eq!(check_request_shape(&request), Ok(()));
    }

    #[rstest]
    #[case::personal_business_loan(loan(CreditType::BusinessLoan), CustomerType::Personal, false, "cannot have business loans")]
    #[case::vip_business_loan(loan(CreditType::BusinessLoan), CustomerType::PersonalVip, false, "cannot have business loans")]
    #[case::second_personal_loan(loan(CreditType::PersonalLoan), CustomerType::Personal, true, "one personal loan")]
    #[case::card_without_limit({ let mut r = credit_card(); r.credit_limit = None; r }, CustomerType::Business, false, "credit limit greater than 0")]
    #[case::card_with_term({ let mut r = credit_card(); r.term_months = Some(6); r }, CustomerType::Business, false, "cannot have term months")]
    #[case::card_with_monthly_payment({ let mut r = credit_card(); r.monthly_payment = Some(Decimal::ONE); r }, CustomerType::Personal, false, "cannot have monthly payment")]
    #[case::loan_without_term({ let mut r = loan(CreditType::BusinessLoan); r.term_months = Some(0); r }, CustomerType::Business, false, "term in months greater than 0")]
    #[case::loan_with_limit({ let mut r = loan(CreditType::PersonalLoan); r.credit_limit = Some(Decimal::ONE); r }, CustomerType::Personal, false, "Loans cannot have credit limit")]
    #[case::debit_without_main({ let mut r = debit_card(); r.main_account_id = Some(" ".to_string()); r }, CustomerType::Personal, false, "require a main account")]
    #[case::debit_without_withdrawal_limit({ let mut r = debit_card(); r.daily_withdrawal_limit = None; r }, CustomerType::Personal, false, "daily withdrawal limit")]
    #[case::debit_without_purchase_limit({ let mut r = debit_card(); r.daily_purchase_limit = Some(Decimal::ZERO); r }, CustomerType::Personal, false, "daily purchase limit")]
    #[case::debit_without_brand({ let mut r = debit_card(); r.card_brand = None; r }, CustomerType::Personal, false, "card brand")]
    #[case::debit_with_limit({ let mut r = debit_card(); r.credit_limit = Some(Decimal::ONE); r }, CustomerType::Personal, false, "Debit cards cannot have credit limit")]
    #[case::debit_with_term({ let mut r = debit_card(); r.term_months = Some(1); r }, CustomerType::Personal, false, "Debit cards cannot have term months")]
    #[case::debit_with_monthly({ let mut r = debit_card(); r.monthly_payment = Some(Decimal::ONE); r }, CustomerType::Personal, false, "Debit cards cannot have monthly payment")]
    #[case::debit_with_amount({ let mut r = debit_card(); r.amount = Some(Decimal::ONE); r }, CustomerType::Personal, false, "Debit cards cannot have amount")]
    fn test_product_rule_rejections(
        #[case] request: CreditRequest,
        #[case] customer_type: CustomerType,
        #[case] holds_personal_loan: bool,
        #[case] expected: &str,
    ) {
        match check_product_rules(&request, &customer_type, holds_personal_loan) {
            Err(CreditError::Validation { reason }) => {
                assert!(reason.contains(expected), "unexpected reason: {}", reason)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[rstest]
    #[case::business_gets_business_loan(loan(CreditType::BusinessLoan), CustomerType::BusinessPyme, false)]
    #[case::business_may_hold_many_personal_loans(loan(CreditType::PersonalLoan), CustomerType::Business, true)]
    #[case::first_personal_loan(loan(CreditType::PersonalLoan), CustomerType::Personal, false)]
    #[case::unknown_segment_card(credit_card(), CustomerType::Other("GOVERNMENT".to_string()), false)]
    #[case::zero_fields_are_absent({ let mut r = debit_card(); r.amount = Some(Decimal::ZERO); r.term_months = Some(0); r }, CustomerType::Personal, false)]
    fn test_product_rules_accept(
        #[case] request: CreditRequest,
        #[case] customer_type: CustomerType,
        #[case] holds_personal_loan: bool,
    ) {
        assert_eq!(
            check_product_rules(&request, &customer_type, holds_personal_loan),
            Ok(())
        );
    }

    struct Fixture {
        store: Arc<InMemoryCreditStore>,
        engine: ValidationEngine,
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCreditStore::new());
        let customers = Arc::new(InMemoryCustomerDirectory::new());
        customers.insert("u1", CustomerType::Personal);
        customers.insert("u2", CustomerType::Business);
        let accounts = Arc::new(InMemoryAccountDirectory::new());
        for (id, owner, status) in [
            ("acc-main", "u1", AccountStatus::Active),
            ("acc-2", "u1", AccountStatus::Active),
            ("acc-3", "u1", AccountStatus::Active),
            ("acc-closed", "u1", AccountStatus::Closed),
            ("acc-other", "u2", AccountStatus::Active),
        ] {
            accounts.insert(AccountInfo {
                id: id.to_string(),
                account_number: format!("191-{}", id),
                account_type: "SAVINGS".to_string(),
                customer_id: owner.to_string(),
                balance: Decimal::new(500, 0),
                status,
            });
        }
        let engine = ValidationEngine::new(
            store.clone(),
            customers,
            accounts,
            Arc::new(FixedClock::at_date(today())),
            Duration::from_millis(500),
        );
        Fixture { store, engine }
    }

    fn stored(id: &str, customer: &str, terms: ProductTerms, due_date: NaiveDate) -> CreditRecord {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        CreditRecord {
            id: id.to_string(),
            credit_number: format!("NUM-{:0>10}", id),
            customer_id: customer.to_string(),
            outstanding_balance: Decimal::ZERO,
            interest_rate: Decimal::ZERO,
            status: CreditStatus::Active,
            created_at: created,
            updated_at: created,
            due_date,
            version: 0,
            terms,
        }
    }

    fn expect_validation(result: Result<ValidatedRequest, CreditError>, expected: &str) {
        match result {
            Err(CreditError::Validation { reason }) => {
                assert!(reason.contains(expected), "unexpected reason: {}", reason)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_accepts_first_personal_loan() {
        let fixture = fixture();
        let validated = fixture
            .engine
            .validate(loan(CreditType::PersonalLoan))
            .await
            .unwrap();
        assert_eq!(validated.request().credit_type, CreditType::PersonalLoan);
    }

    #[tokio::test]
    async fn test_validate_rejects_second_personal_loan() {
        let fixture = fixture();
        let existing = ProductTerms::PersonalLoan(LoanTerms {
            amount: Decimal::new(1000, 0),
            term_months: 6,
            monthly_payment: Decimal::ZERO,
            remaining_payments: 6,
        });
        fixture
            .store
            .save(stored("l1", "u1", existing, due()), None)
            .await
            .unwrap();

        let result = fixture.engine.validate(loan(CreditType::PersonalLoan)).await;
        expect_validation(result, "Personal customers can only have one personal loan");
    }

    #[tokio::test]
    async fn test_validate_unknown_customer_is_not_found() {
        let fixture = fixture();
        let mut request = credit_card();
        request.customer_id = "ghost".to_string();
        let result = fixture.engine.validate(request).await;
        assert_eq!(result, Err(CreditError::customer_not_found("ghost")));
    }

    #[tokio::test]
    async fn test_delinquency_gate_blocks_creation() {
        let fixture = fixture();
        let card = ProductTerms::CreditCard(CardTerms {
            credit_limit: Decimal::new(100, 0),
            available_credit: Decimal::new(100, 0),
        });
        let overdue = NaiveDate::from_ymd_opt(2024, 3, 19).unwrap();
        fixture
            .store
            .save(stored("c1", "u1", card, overdue), None)
            .await
            .unwrap();

        let result = fixture.engine.validate(credit_card()).await;
        expect_validation(result, "overdue credits");
    }

    #[tokio::test]
    async fn test_delinquency_gate_runs_before_account_checks() {
        let fixture = fixture();
        let card = ProductTerms::CreditCard(CardTerms {
            credit_limit: Decimal::new(100, 0),
            available_credit: Decimal::new(100, 0),
        });
        let overdue = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        fixture
            .store
            .save(stored("c1", "u1", card, overdue), None)
            .await
            .unwrap();

        let mut request = debit_card();
        request.main_account_id = Some("acc-missing".to_string());
        expect_validation(fixture.engine.validate(request).await, "overdue credits");
    }

    #[tokio::test]
    async fn test_debit_card_with_associated_accounts_passes() {
        let fixture = fixture();
        let mut request = debit_card();
        request.associated_accounts = vec![
            AssociatedAccountRequest {
                account_id: "acc-2".to_string(),
                sequence_order: 1,
            },
            AssociatedAccountRequest {
                account_id: "acc-3".to_string(),
                sequence_order: 2,
            },
        ];
        assert!(fixture.engine.validate(request).await.is_ok());
    }

    #[rstest]
    #[case::missing_main(Some("acc-missing"), vec![], "Main account does not exist")]
    #[case::foreign_main(Some("acc-other"), vec![], "does not belong to customer u1")]
    #[case::closed_main(Some("acc-closed"), vec![], "is not active")]
    #[case::missing_associated(Some("acc-main"), vec![("acc-nope", 1)], "Associated account does not exist")]
    #[case::foreign_associated(Some("acc-main"), vec![("acc-other", 1)], "Associated account acc-other does not belong")]
    #[case::closed_associated(Some("acc-main"), vec![("acc-closed", 1)], "Associated account acc-closed is not active")]
    #[case::main_as_associated(Some("acc-main"), vec![("acc-main", 1)], "cannot be listed as an associated account")]
    #[case::duplicate_order(Some("acc-main"), vec![("acc-2", 1), ("acc-3", 1)], "Duplicate sequence order: 1")]
    #[tokio::test]
    async fn test_debit_card_account_rejections(
        #[case] main: Option<&str>,
        #[case] associated: Vec<(&str, u32)>,
        #[case] expected: &str,
    ) {
        let fixture = fixture();
        let mut request = debit_card();
        request.main_account_id = main.map(str::to_string);
        request.associated_accounts = associated
            .into_iter()
            .map(|(account_id, sequence_order)| AssociatedAccountRequest {
                account_id: account_id.to_string(),
                sequence_order,
            })
            .collect();
        expect_validation(fixture.engine.validate(request).await, expected);
    }
}
