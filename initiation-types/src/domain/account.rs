//! Account references carried on a payment, and the funds oracle's view of
//! a customer's accounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Kind of account a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AccountType {
    Current,
    Savings,
    External,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Current => "Current",
            AccountType::Savings => "Savings",
            AccountType::External => "External",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Current" => Ok(AccountType::Current),
            "Savings" => Ok(AccountType::Savings),
            "External" => Ok(AccountType::External),
            other => Err(DomainError::ValidationError(format!(
                "Unknown account type: {other}"
            ))),
        }
    }
}

/// Identifies one side of a payment.
///
/// The debtor side must name its owning customer so the funds oracle can be
/// asked about it; on the creditor side `customer_id` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    #[schema(example = "acc1")]
    pub account_id: String,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "GB00CUST1000000001")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "cust1")]
    pub customer_id: Option<String>,
}

impl AccountRef {
    pub fn new(account_id: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            account_id: account_id.into(),
            account_type,
            iban: None,
            customer_id: None,
        }
    }

    pub fn with_iban(mut self, iban: impl Into<String>) -> Self {
        self.iban = Some(iban.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }
}

/// An account as reported by the Account Funds Oracle.
///
/// Only `id` and `balance` feed the funds check; the remaining fields are
/// kept so the record can be logged and relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccount {
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[schema(value_type = f64, example = 15000.0)]
    pub balance: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}
