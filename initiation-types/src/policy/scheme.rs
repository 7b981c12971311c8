use rust_decimal::Decimal;

use crate::domain::{Amount, CurrencyCode};

/// Currency and ceiling accepted by the payment scheme (rail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeEligibility {
    currency: CurrencyCode,
    max_amount: Decimal,
}

impl SchemeEligibility {
    pub fn new(currency: CurrencyCode, max_amount: Decimal) -> Self {
        Self {
            currency,
            max_amount,
        }
    }

    /// Faster-payments-style scheme: sterling only.
    pub fn gbp(max_amount: Decimal) -> Self {
        Self::new(CurrencyCode::gbp(), max_amount)
    }

    pub fn is_eligible(&self, currency: &CurrencyCode, amount: Amount) -> bool {
        *currency == self.currency && amount.value() <= self.max_amount
    }
}
