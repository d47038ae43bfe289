//! Credit service orchestration
//!
//! This module provides the `CreditService`, the entry point for every credit operation.
//! It composes the validation engine, the balance mutator, the ledger reconstructor and
//! the inquiry responder with the collaborator traits.
//!
//! # Design
//!
//! Each operation is a short sequence of `async` steps composed with `?`; the first error
//! ends the operation. Mutations follow one read-modify-write cycle:
//!
//! 1. load the record and remember its version
//! 2. compute the new state on a copy
//! 3. save with the remembered version
//!
//! A concurrent writer makes step 3 fail with `Conflict`. The service does not retry;
//! callers that want retries (the batch processor) repeat the whole cycle.
//!
//! # Architecture
//!
//! ```text
//! CreditService
//!     ├── Arc<dyn CreditStore>          (records, versioned saves)
//!     ├── Arc<dyn CustomerDirectory>    (customer segment, payer existence)
//!     ├── Arc<dyn AccountDirectory>     (debit card accounts)
//!     ├── Arc<dyn TransactionHistory>   (current-month transactions)
//!     ├── Arc<dyn Clock>                (now / today)
//!     ├── ValidationEngine
//!     └── InquiryResponder
//! ```
//!
//! # Thread Safety
//!
//! The service is cloneable and every field is shared behind `Arc`, so clones can run on
//! separate tokio tasks. It holds no lock of its own.

use std::sync::Arc;

use chrono::Days;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::balance_mutator;
use super::clock::Clock;
use super::creation::initialize_record;
use super::inquiry_responder::InquiryResponder;
use super::ledger_reconstructor;
use super::traits::{AccountDirectory, CreditStore, CustomerDirectory, TransactionHistory};
use super::upstream::bounded;
use super::validation_engine::{check_product_fields, check_request_shape, ValidationEngine};
use crate::config::EngineConfig;
use crate::types::{
    AccountStatus, AssociatedAccount, BalanceInquiry, BalanceInquiryResponse, CardTerms,
    CreditBalance, CreditDailyBalance, CreditError, CreditOperation, CreditRecord, CreditRequest,
    CreditStatus, CreditType, DebitCardBalance, DebitCardTerms, LoanTerms, ProductTerms,
};

const CREDIT_STORE: &str = "credit store";
const CUSTOMER_DIRECTORY: &str = "customer directory";
const ACCOUNT_DIRECTORY: &str = "account directory";
const TRANSACTION_HISTORY: &str = "transaction history";

/// Product type under which credits are filed in the transaction history
const HISTORY_PRODUCT_TYPE: &str = "CREDIT";

/// Log a failed operation at the level its error class calls for
fn log_failure(operation: &str, credit_id: &str, err: &CreditError) {
    match err {
        CreditError::UpstreamUnavailable { .. } => {
            error!(operation, credit_id, error = %err, "collaborator failure")
        }
        _ => warn!(operation, credit_id, error = %err, "operation rejected"),
    }
}

/// Entry point for credit operations
#[derive(Clone)]
pub struct CreditService {
    store: Arc<dyn CreditStore>,
    customers: Arc<dyn CustomerDirectory>,
    accounts: Arc<dyn AccountDirectory>,
    history: Arc<dyn TransactionHistory>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    validation: ValidationEngine,
    inquiries: InquiryResponder,
}

impl CreditService {
    /// Create a service over the given collaborators
    pub fn new(
        store: Arc<dyn CreditStore>,
        customers: Arc<dyn CustomerDirectory>,
        accounts: Arc<dyn AccountDirectory>,
        history: Arc<dyn TransactionHistory>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let validation = ValidationEngine::new(
            Arc::clone(&store),
            Arc::clone(&customers),
            Arc::clone(&accounts),
            Arc::clone(&clock),
            config.upstream_timeout,
        );
        let inquiries = InquiryResponder::new(
            Arc::clone(&store),
            Arc::clone(&accounts),
            config.upstream_timeout,
        );

        Self {
            store,
            customers,
            accounts,
            history,
            clock,
            config,
            validation,
            inquiries,
        }
    }

    /// Validate a creation request and persist the new credit
    ///
    /// # Returns
    ///
    /// The stored record, ACTIVE, with balances initialized for its product type.
    ///
    /// # Errors
    ///
    /// * `Validation` - a business rule failed
    /// * `NotFound` - the customer is unknown
    /// * `UpstreamUnavailable` - a collaborator failed or timed out
    pub async fn create_credit(&self, request: CreditRequest) -> Result<CreditRecord, CreditError> {
        info!(
            customer_id = %request.customer_id,
            credit_type = %request.credit_type,
            credit_number = %request.credit_number,
            "creating credit"
        );

        let result = self.create_validated(request).await;
        match &result {
            Ok(record) => info!(
                credit_id = %record.id,
                credit_type = %record.credit_type(),
                "credit created"
            ),
            Err(err) => log_failure("create", "-", err),
        }
        result
    }

    async fn create_validated(&self, request: CreditRequest) -> Result<CreditRecord, CreditError> {
        let validated = self.validation.validate(request).await?;
        let record = initialize_record(validated, self.clock.as_ref(), &self.config)?;
        self.persist(record, None).await
    }

    /// Fetch one credit
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no credit has this id.
    pub async fn get_credit(&self, id: &str) -> Result<CreditRecord, CreditError> {
        self.load(id).await
    }

    /// List credits, optionally filtered by customer and product type
    pub async fn list_credits(
        &self,
        customer_id: Option<&str>,
        credit_type: Option<CreditType>,
    ) -> Result<Vec<CreditRecord>, CreditError> {
        match customer_id {
            Some(customer_id) => {
                bounded(
                    CREDIT_STORE,
                    self.config.upstream_timeout,
                    self.store.query_by_customer(customer_id, credit_type),
                )
                .await
            }
            None => {
                let all = bounded(
                    CREDIT_STORE,
                    self.config.upstream_timeout,
                    self.store.list_all(),
                )
                .await?;
                Ok(all
                    .into_iter()
                    .filter(|record| credit_type.is_none_or(|wanted| record.credit_type() == wanted))
                    .collect())
            }
        }
    }

    /// Credits of one customer
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the customer holds no matching credit.
    pub async fn credits_by_customer(
        &self,
        customer_id: &str,
        credit_type: Option<CreditType>,
    ) -> Result<Vec<CreditRecord>, CreditError> {
        let credits = self.list_credits(Some(customer_id), credit_type).await?;
        if credits.is_empty() {
            let what = match credit_type {
                Some(credit_type) => format!("{} with type {}", customer_id, credit_type),
                None => customer_id.to_string(),
            };
            return Err(CreditError::not_found("Credits for customer", &what));
        }
        Ok(credits)
    }

    /// Administrative update of a credit's descriptive fields and terms
    ///
    /// Balances, status, creation time and the installment counter are kept from the stored
    /// record, as are a debit card's status and expiry. The product type and the owner
    /// cannot change. A credit card's available credit is re-derived from the new limit.
    ///
    /// # Errors
    ///
    /// * `NotFound` - no credit has this id
    /// * `Validation` - the request is malformed or tries to change type or owner
    /// * `Conflict` - the record changed since it was read
    pub async fn update_credit(
        &self,
        id: &str,
        request: CreditRequest,
    ) -> Result<CreditRecord, CreditError> {
        info!(credit_id = id, "updating credit");

        let result = async {
            let existing = self.load(id).await?;
            let updated = self.apply_update(&existing, request)?;
            self.persist(updated, Some(existing.version)).await
        }
        .await;

        match &result {
            Ok(record) => info!(credit_id = id, version = record.version, "credit updated"),
            Err(err) => log_failure("update", id, err),
        }
        result
    }

    fn apply_update(
        &self,
        existing: &CreditRecord,
        request: CreditRequest,
    ) -> Result<CreditRecord, CreditError> {
        check_request_shape(&request)?;
        if request.credit_type != existing.credit_type() {
            return Err(CreditError::validation(format!(
                "Credit type cannot change from {} to {}",
                existing.credit_type(),
                request.credit_type
            )));
        }
        if request.customer_id != existing.customer_id {
            return Err(CreditError::validation("Credit owner cannot change"));
        }
        check_product_fields(&request)?;

        let missing = |field: &str| {
            CreditError::validation(format!("{} requires {}", request.credit_type, field))
        };

        let terms = match &existing.terms {
            ProductTerms::CreditCard(_) => {
                let credit_limit = request.credit_limit.ok_or_else(|| missing("a credit limit"))?;
                let available_credit = credit_limit
                    .checked_sub(existing.outstanding_balance)
                    .filter(|available| *available >= Decimal::ZERO)
                    .ok_or_else(|| {
                        CreditError::validation(format!(
                            "Credit limit ({:.2}) is below the outstanding balance ({:.2})",
                            credit_limit, existing.outstanding_balance
                        ))
                    })?;
                ProductTerms::CreditCard(CardTerms {
                    credit_limit,
                    available_credit,
                })
            }
            ProductTerms::PersonalLoan(loan) | ProductTerms::BusinessLoan(loan) => {
                let updated = LoanTerms {
                    amount: request.amount.ok_or_else(|| missing("an amount"))?,
                    term_months: request.term_months.ok_or_else(|| missing("a term"))?,
                    monthly_payment: request.monthly_payment.unwrap_or_default(),
                    remaining_payments: loan.remaining_payments,
                };
                if existing.credit_type() == CreditType::PersonalLoan {
                    ProductTerms::PersonalLoan(updated)
                } else {
                    ProductTerms::BusinessLoan(updated)
                }
            }
            ProductTerms::DebitCard(debit) => {
                let today = self.clock.today();
                let associated_accounts = request
                    .associated_accounts
                    .iter()
                    .map(|account| {
                        let previous = debit
                            .associated_accounts
                            .iter()
                            .find(|known| known.account_id == account.account_id);
                        AssociatedAccount {
                            account_id: account.account_id.clone(),
                            sequence_order: account.sequence_order,
                            associated_at: previous.map_or(today, |known| known.associated_at),
                            status: previous.map_or(AccountStatus::Active, |known| known.status),
                        }
                    })
                    .collect();
                ProductTerms::DebitCard(DebitCardTerms {
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
                    card_status: debit.card_status,
                    expiration_date: debit.expiration_date,
                })
            }
        };

        let mut updated = existing.clone();
        updated.credit_number = request.credit_number.trim().to_string();
        updated.interest_rate = if existing.credit_type() == CreditType::DebitCard {
            Decimal::ZERO
        } else {
            request.interest_rate
        };
        updated.due_date = request.due_date;
        updated.terms = terms;
        updated.updated_at = self.clock.now();
        Ok(updated)
    }

    /// Owner payment
    ///
    /// # Errors
    ///
    /// * `NotFound` - no credit has this id
    /// * `InvalidState` - the credit is not ACTIVE
    /// * `Validation` - the amount is not positive or exceeds the outstanding balance
    /// * `Conflict` - the record changed since it was read
    pub async fn make_payment(&self, id: &str, amount: Decimal) -> Result<CreditRecord, CreditError> {
        self.apply_operation(id, &CreditOperation::Payment { amount })
            .await
    }

    /// Card purchase at a merchant
    ///
    /// # Errors
    ///
    /// As [`make_payment`](Self::make_payment), plus `Validation` when the credit is not a
    /// credit card or the amount exceeds the available credit.
    pub async fn charge_consumption(
        &self,
        id: &str,
        amount: Decimal,
        merchant: &str,
    ) -> Result<CreditRecord, CreditError> {
        self.apply_operation(
            id,
            &CreditOperation::Consumption {
                amount,
                merchant: merchant.to_string(),
            },
        )
        .await
    }

    /// Payment by another customer
    ///
    /// # Errors
    ///
    /// As [`make_payment`](Self::make_payment), plus `NotFound` when the payer is unknown;
    /// the record is left untouched in that case.
    pub async fn make_third_party_payment(
        &self,
        id: &str,
        amount: Decimal,
        payer_customer_id: &str,
    ) -> Result<CreditRecord, CreditError> {
        self.apply_operation(
            id,
            &CreditOperation::ThirdPartyPayment {
                amount,
                payer_customer_id: payer_customer_id.to_string(),
            },
        )
        .await
    }

    /// Run one read-modify-write cycle for a balance operation
    ///
    /// # Returns
    ///
    /// The saved record with its new version.
    pub async fn apply_operation(
        &self,
        id: &str,
        operation: &CreditOperation,
    ) -> Result<CreditRecord, CreditError> {
        info!(
            credit_id = id,
            operation = operation.name(),
            amount = %operation.amount(),
            "applying operation"
        );

        let result = self.mutate(id, operation).await;
        match &result {
            Ok(record) => {
                info!(
                    credit_id = id,
                    operation = operation.name(),
                    outstanding = %record.outstanding_balance,
                    status = %record.status,
                    version = record.version,
                    "operation applied"
                );
                if record.status == CreditStatus::Paid {
                    info!(credit_id = id, "credit fully paid");
                }
            }
            Err(err) => log_failure(operation.name(), id, err),
        }
        result
    }

    async fn mutate(
        &self,
        id: &str,
        operation: &CreditOperation,
    ) -> Result<CreditRecord, CreditError> {
        let current = self.load(id).await?;
        let next = balance_mutator::apply(&current, operation, self.clock.now())?;

        if let CreditOperation::ThirdPartyPayment {
            payer_customer_id, ..
        } = operation
        {
            let payer_exists = bounded(
                CUSTOMER_DIRECTORY,
                self.config.upstream_timeout,
                self.customers.customer_exists(payer_customer_id),
            )
            .await?;
            if !payer_exists {
                return Err(CreditError::customer_not_found(payer_customer_id));
            }
        }

        self.persist(next, Some(current.version)).await
    }

    /// Balance summary with the minimum payment due
    pub async fn credit_balance(&self, id: &str) -> Result<CreditBalance, CreditError> {
        let record = self.load(id).await?;

        let minimum_payment = match &record.terms {
            ProductTerms::CreditCard(_) => record
                .outstanding_balance
                .checked_mul(self.config.minimum_payment_rate)
                .map(|payment| payment.round_dp(2))
                .ok_or_else(|| CreditError::arithmetic_overflow("minimum payment", id))?,
            ProductTerms::PersonalLoan(loan) | ProductTerms::BusinessLoan(loan) => {
                loan.monthly_payment
            }
            ProductTerms::DebitCard(_) => Decimal::ZERO,
        };
        let due_date = self
            .clock
            .today()
            .checked_add_days(Days::new(u64::from(self.config.balance_due_days)))
            .ok_or_else(|| CreditError::arithmetic_overflow("due date", id))?;

        Ok(CreditBalance {
            credit_id: record.id.clone(),
            credit_number: record.credit_number.clone(),
            credit_type: record.credit_type(),
            outstanding_balance: record.outstanding_balance,
            available_credit: record.available_credit(),
            minimum_payment,
            due_date,
            currency: self.config.currency.clone(),
        })
    }

    /// Current-month daily balances of one credit
    pub async fn credit_daily_balance(&self, id: &str) -> Result<CreditDailyBalance, CreditError> {
        let record = self.load(id).await?;
        self.daily_balance_of(record).await
    }

    /// Current-month daily balances of every credit a customer holds
    pub async fn customer_daily_balances(
        &self,
        customer_id: &str,
    ) -> Result<Vec<CreditDailyBalance>, CreditError> {
        info!(customer_id, "computing daily balances");
        let credits = self.list_credits(Some(customer_id), None).await?;

        let mut balances = Vec::with_capacity(credits.len());
        for record in credits {
            balances.push(self.daily_balance_of(record).await?);
        }
        Ok(balances)
    }

    async fn daily_balance_of(&self, record: CreditRecord) -> Result<CreditDailyBalance, CreditError> {
        let transactions = match bounded(
            TRANSACTION_HISTORY,
            self.config.upstream_timeout,
            self.history
                .list_for_product_current_month(&record.id, HISTORY_PRODUCT_TYPE),
        )
        .await
        {
            Ok(transactions) => transactions,
            Err(err) => {
                warn!(
                    credit_id = %record.id,
                    error = %err,
                    "transaction history unavailable, reconstructing without transactions"
                );
                Vec::new()
            }
        };

        let trail = ledger_reconstructor::reconstruct(
            &record.id,
            record.outstanding_balance,
            self.clock.local_date(record.created_at),
            self.clock.today(),
            &transactions,
        )?;

        Ok(CreditDailyBalance {
            current_balance: record.signed_balance(),
            credit_type: record.credit_type(),
            id: record.id,
            credit_number: record.credit_number,
            customer_id: record.customer_id,
            daily_average: trail.daily_average,
            daily_balances: trail.daily_balances,
        })
    }

    /// Whether the customer holds an ACTIVE credit past its due date
    pub async fn has_overdue_credits(&self, customer_id: &str) -> Result<bool, CreditError> {
        bounded(
            CREDIT_STORE,
            self.config.upstream_timeout,
            self.store
                .query_active_overdue(customer_id, self.clock.today()),
        )
        .await
    }

    /// Balance of the main account behind a debit card
    ///
    /// # Errors
    ///
    /// * `NotFound` - no credit has this id, or the main account is gone
    /// * `Validation` - the credit is not a debit card
    /// * `UpstreamUnavailable` - the account directory failed
    pub async fn debit_card_main_account_balance(
        &self,
        card_id: &str,
    ) -> Result<DebitCardBalance, CreditError> {
        let record = self.load(card_id).await?;
        let Some(debit) = record.debit_card_terms() else {
            return Err(CreditError::validation(format!(
                "Product is not a debit card. Type: {}",
                record.credit_type()
            )));
        };

        let account = bounded(
            ACCOUNT_DIRECTORY,
            self.config.upstream_timeout,
            self.accounts.get_account(&debit.main_account_id),
        )
        .await?
        .ok_or_else(|| CreditError::not_found("Account", &debit.main_account_id))?;

        Ok(DebitCardBalance {
            card_id: record.id.clone(),
            card_number: record.credit_number.clone(),
            card_status: debit.card_status,
            main_account_id: debit.main_account_id.clone(),
            account_number: account.account_number,
            account_type: account.account_type,
            current_balance: account.balance,
            available_balance: account.balance,
            currency: self.config.currency.clone(),
            last_updated: self.clock.now(),
        })
    }

    /// Answer a balance-sufficiency inquiry
    pub async fn answer_inquiry(
        &self,
        inquiry: BalanceInquiry,
    ) -> Result<BalanceInquiryResponse, CreditError> {
        info!(
            inquiry_id = %inquiry.inquiry_id,
            credit_id = %inquiry.credit_id,
            "answering balance inquiry"
        );
        self.inquiries.respond(inquiry).await
    }

    async fn load(&self, id: &str) -> Result<CreditRecord, CreditError> {
        bounded(CREDIT_STORE, self.config.upstream_timeout, self.store.get(id))
            .await?
            .ok_or_else(|| CreditError::credit_not_found(id))
    }

    async fn persist(
        &self,
        record: CreditRecord,
        expected_version: Option<u64>,
    ) -> Result<CreditRecord, CreditError> {
        bounded(
            CREDIT_STORE,
            self.config.upstream_timeout,
            self.store.save(record, expected_version),
        )
        .await
    }
}
