//! Balance-sufficiency inquiry messages
//!
//! Another subsystem asks whether a credit can cover an amount; the answer is a
//! [`ValidationResult`] wrapped into a [`BalanceInquiryResponse`] keyed by the inquiry id.
//! Both messages serialize with camelCase names so a transport can carry them unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a sufficiency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Empty when valid
    pub reason: String,
    pub available_balance: Decimal,
}

impl ValidationResult {
    pub fn valid(available_balance: Decimal) -> Self {
        ValidationResult {
            is_valid: true,
            reason: String::new(),
            available_balance,
        }
    }

    pub fn invalid(reason: impl Into<String>, available_balance: Decimal) -> Self {
        ValidationResult {
            is_valid: false,
            reason: reason.into(),
            available_balance,
        }
    }
}

/// Inbound inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInquiry {
    pub inquiry_id: String,
    pub credit_id: String,
    pub required_amount: Decimal,
    pub transaction_id: Option<String>,
}

/// Outbound answer, correlated by `inquiry_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInquiryResponse {
    pub inquiry_id: String,
    pub credit_id: String,
    pub is_valid: bool,
    pub reason: String,
    pub available_balance: Decimal,
    pub transaction_id: Option<String>,
}

impl BalanceInquiryResponse {
    /// Pair an inquiry with the result computed for it
    pub fn answer(inquiry: BalanceInquiry, result: ValidationResult) -> Self {
        BalanceInquiryResponse {
            inquiry_id: inquiry.inquiry_id,
            credit_id: inquiry.credit_id,
            is_valid: result.is_valid,
            reason: result.reason,
            available_balance: result.available_balance,
            transaction_id: inquiry.transaction_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inquiry_uses_camel_case_names() {
        let json = r#"{"inquiryId":"q-1","creditId":"c-1","requiredAmount":"150.00","transactionId":"t-9"}"#;
        let inquiry: BalanceInquiry = serde_json::from_str(json).unwrap();
        assert_eq!(inquiry.inquiry_id, "q-1");
        assert_eq!(inquiry.required_amount, Decimal::new(15000, 2));

        let response =
            BalanceInquiryResponse::answer(inquiry, ValidationResult::valid(Decimal::new(400, 0)));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["inquiryId"], "q-1");
        assert_eq!(value["isValid"], true);
        assert_eq!(value["reason"], "");
        assert_eq!(value["transactionId"], "t-9");
    }
}
