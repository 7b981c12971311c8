//! Fixed-point payment amounts and currency codes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Largest amount a payment can carry (12 digits, 2 of them fractional).
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// A strictly positive amount with at most two fractional digits.
///
/// The value is always held at scale 2, so `10.5` displays as `10.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Validates and wraps a decimal amount.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount);
        }
        if value.normalize().scale() > 2 {
            return Err(DomainError::AmountPrecision);
        }
        if value > MAX_AMOUNT {
            return Err(DomainError::AmountTooLarge);
        }
        let mut value = value;
        value.rescale(2);
        Ok(Self(value))
    }

    /// Builds an amount from integer minor units (pence, cents).
    pub fn from_minor_units(minor: i64) -> Result<Self, DomainError> {
        Self::new(Decimal::new(minor, 2))
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        // bounded by MAX_AMOUNT, so the mantissa always fits
        self.0.mantissa() as i64
    }

    /// Returns the decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three-letter ISO 4217 style currency code, e.g. `GBP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(example = "GBP")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Accepts exactly three ASCII uppercase letters.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(DomainError::InvalidCurrency(code.to_string()))
        }
    }

    /// Pound sterling.
    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
