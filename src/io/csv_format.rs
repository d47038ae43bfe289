//! CSV format handling for replay input and credit output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for the operations, customers and accounts files
//! - Conversion from rows to domain types through the [`CsvRow`] trait
//! - Credit output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    AccountInfo, AccountStatus, CardBrand, CreditError, CreditOperation, CreditRecord,
    CreditRequest, CreditType, CustomerId, CustomerType, ReplayOperation,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Account type reported for accounts loaded from a replay file
const REPLAY_ACCOUNT_TYPE: &str = "SAVINGS";

/// A CSV row that converts into a domain value
///
/// Readers deserialize the row and then call `convert`; a conversion error is reported
/// with the line it came from and the row is skipped.
pub trait CsvRow: DeserializeOwned {
    type Output;

    fn convert(self) -> Result<Self::Output, String>;
}

/// Row of the operations file
///
/// Columns: op, credit, customer, credit_type, amount, limit, term, due_date, reference,
/// brand. Which columns matter depends on `op`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct OpsCsvRecord {
    pub op: String,
    pub credit: String,
    pub customer: Option<String>,
    pub credit_type: Option<String>,
    pub amount: Option<String>,
    pub limit: Option<String>,
    pub term: Option<String>,
    pub due_date: Option<String>,
    pub reference: Option<String>,
    pub brand: Option<String>,
}

/// Row of the customers file: id, customer_type
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CustomerCsvRecord {
    pub id: CustomerId,
    pub customer_type: String,
}

/// Row of the accounts file: id, customer, status, balance
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub id: String,
    pub customer: CustomerId,
    pub status: String,
    pub balance: String,
}

/// Non-empty trimmed value of an optional column
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_decimal(field: &str, value: &Option<String>, credit: &str) -> Result<Option<Decimal>, String> {
    present(value)
        .map(|raw| {
            Decimal::from_str(raw)
                .map_err(|_| format!("Invalid {} '{}' for credit {}", field, raw, credit))
        })
        .transpose()
}

fn required_amount(record: &OpsCsvRecord) -> Result<Decimal, String> {
    parse_decimal("amount", &record.amount, &record.credit)?.ok_or_else(|| {
        format!(
            "{} on credit {} requires an amount",
            record.op.trim(),
            record.credit
        )
    })
}

/// Convert an operations row into a replay operation
///
/// Creation rows keep every supplied column, even ones the product does not accept, so
/// that the validation engine rejects them instead of the reader dropping them.
///
/// # Returns
///
/// Result containing either:
/// - Ok(ReplayOperation) - Successfully converted row
/// - Err(String) - Error message describing the conversion failure
pub fn convert_ops_record(record: OpsCsvRecord) -> Result<ReplayOperation, String> {
    let credit_number = record.credit.trim().to_string();
    if credit_number.is_empty() {
        return Err(format!("Operation '{}' has no credit", record.op.trim()));
    }

    match record.op.trim().to_lowercase().as_str() {
        "create" => convert_create(&record, credit_number),
        "payment" => Ok(ReplayOperation::Apply {
            operation: CreditOperation::Payment {
                amount: required_amount(&record)?,
            },
            credit_number,
        }),
        "consumption" => Ok(ReplayOperation::Apply {
            operation: CreditOperation::Consumption {
                amount: required_amount(&record)?,
                merchant: present(&record.reference).unwrap_or_default().to_string(),
            },
            credit_number,
        }),
        "third_party" => {
            let payer = present(&record.customer)
                .ok_or_else(|| format!("third_party on credit {} requires a payer", credit_number))?;
            Ok(ReplayOperation::Apply {
                operation: CreditOperation::ThirdPartyPayment {
                    amount: required_amount(&record)?,
                    payer_customer_id: payer.to_string(),
                },
                credit_number,
            })
        }
        other => Err(format!(
            "Invalid operation: '{}' for credit {}",
            other, credit_number
        )),
    }
}

fn convert_create(record: &OpsCsvRecord, credit_number: String) -> Result<ReplayOperation, String> {
    let credit_type = present(&record.credit_type)
        .ok_or_else(|| format!("create of {} requires a credit_type", credit_number))?
        .parse::<CreditType>()?;
    let customer = present(&record.customer)
        .ok_or_else(|| format!("create of {} requires a customer", credit_number))?;
    let due_raw = present(&record.due_date)
        .ok_or_else(|| format!("create of {} requires a due_date", credit_number))?;
    let due_date = NaiveDate::parse_from_str(due_raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid due_date '{}' for credit {}", due_raw, credit_number))?;

    let amount = parse_decimal("amount", &record.amount, &credit_number)?;
    let limit = parse_decimal("limit", &record.limit, &credit_number)?;
    let term_months = present(&record.term)
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| format!("Invalid term '{}' for credit {}", raw, credit_number))
        })
        .transpose()?;
    let card_brand = present(&record.brand)
        .map(CardBrand::from_str)
        .transpose()?;

    let mut request = CreditRequest::new(credit_number, credit_type, customer, due_date);
    request.amount = amount;
    request.term_months = term_months;
    request.card_brand = card_brand;

    if credit_type == CreditType::DebitCard {
        request.daily_withdrawal_limit = limit;
        request.daily_purchase_limit = limit;
        request.main_account_id = present(&record.reference).map(str::to_string);
    } else {
        request.credit_limit = limit;
    }

    Ok(ReplayOperation::Create(request))
}

impl CsvRow for OpsCsvRecord {
    type Output = ReplayOperation;

    fn convert(self) -> Result<Self::Output, String> {
        convert_ops_record(self)
    }
}

impl CsvRow for CustomerCsvRecord {
    type Output = (CustomerId, CustomerType);

    fn convert(self) -> Result<Self::Output, String> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err("Customer row has no id".to_string());
        }
        let customer_type = self
            .customer_type
            .parse::<CustomerType>()
            .unwrap_or_else(|never| match never {});
        Ok((id, customer_type))
    }
}

impl CsvRow for AccountCsvRecord {
    type Output = AccountInfo;

    fn convert(self) -> Result<Self::Output, String> {
        let status = self.status.parse::<AccountStatus>()?;
        let balance = Decimal::from_str(self.balance.trim())
            .map_err(|_| format!("Invalid balance '{}' for account {}", self.balance, self.id))?;

        Ok(AccountInfo {
            account_number: self.id.clone(),
            id: self.id,
            account_type: REPLAY_ACCOUNT_TYPE.to_string(),
            customer_id: self.customer,
            balance,
            status,
        })
    }
}

/// Write credit records to CSV format
///
/// Columns: credit_number, credit_type, customer, status, outstanding, available,
/// remaining_payments. Credits are sorted by credit number for deterministic output, money
/// is printed with two decimals and `remaining_payments` is empty for cards.
///
/// # Errors
///
/// Returns `ParseError` or `IoError` if the writer fails.
pub fn write_credits_csv(credits: &[CreditRecord], output: &mut dyn Write) -> Result<(), CreditError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "credit_number",
        "credit_type",
        "customer",
        "status",
        "outstanding",
        "available",
        "remaining_payments",
    ])?;

    let mut sorted: Vec<&CreditRecord> = credits.iter().collect();
    sorted.sort_by(|a, b| a.credit_number.cmp(&b.credit_number));

    for credit in sorted {
        writer.write_record(&[
            credit.credit_number.clone(),
            credit.credit_type().to_string(),
            credit.customer_id.clone(),
            credit.status.to_string(),
            format!("{:.2}", credit.outstanding_balance),
            format!("{:.2}", credit.available_credit()),
            credit
                .remaining_payments()
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
