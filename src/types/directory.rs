//! Types returned by the customer and account directories

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segment a customer belongs to
///
/// The directory may know segments the engine has no rules for; those are kept
/// verbatim in `Other` and treated like any non-personal customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerType {
    Personal,
    PersonalVip,
    Business,
    BusinessPyme,
    Other(String),
}

impl CustomerType {
    /// Personal and VIP-personal customers share the personal product rules
    pub fn is_personal(&self) -> bool {
        matches!(self, CustomerType::Personal | CustomerType::PersonalVip)
    }
}

impl FromStr for CustomerType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_uppercase().as_str() {
            "PERSONAL" => CustomerType::Personal,
            "PERSONAL_VIP" => CustomerType::PersonalVip,
            "BUSINESS" => CustomerType::Business,
            "BUSINESS_PYME" => CustomerType::BusinessPyme,
            _ => CustomerType::Other(s.trim().to_string()),
        };
        Ok(kind)
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Personal => f.write_str("PERSONAL"),
            CustomerType::PersonalVip => f.write_str("PERSONAL_VIP"),
            CustomerType::Business => f.write_str("BUSINESS"),
            CustomerType::BusinessPyme => f.write_str("BUSINESS_PYME"),
            CustomerType::Other(name) => f.write_str(name),
        }
    }
}

/// Status of a bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Blocked,
    Closed,
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(AccountStatus::Active),
            "INACTIVE" => Ok(AccountStatus::Inactive),
            "BLOCKED" => Ok(AccountStatus::Blocked),
            "CLOSED" => Ok(AccountStatus::Closed),
            other => Err(format!("Invalid account status: '{}'", other)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
            AccountStatus::Blocked => "BLOCKED",
            AccountStatus::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Account as exposed by the account directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub account_number: String,
    pub account_type: String,
    /// Owner of the account
    pub customer_id: String,
    pub balance: Decimal,
    pub status: AccountStatus,
}
