use rust_decimal::Decimal;

use crate::domain::Amount;

/// Single-payment and daily cumulative ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    single_payment_limit: Decimal,
    daily_payment_limit: Decimal,
}

impl LimitPolicy {
    pub fn new(single_payment_limit: Decimal, daily_payment_limit: Decimal) -> Self {
        Self {
            single_payment_limit,
            daily_payment_limit,
        }
    }

    pub fn single_payment_limit(&self) -> Decimal {
        self.single_payment_limit
    }

    pub fn daily_payment_limit(&self) -> Decimal {
        self.daily_payment_limit
    }

    /// True when `amount` is at or under the per-payment ceiling.
    pub fn within_single_limit(&self, amount: Amount) -> bool {
        amount.value() <= self.single_payment_limit
    }

    /// True when the debtor's same-day spend plus `amount` stays at or under
    /// the daily ceiling.
    pub fn within_daily_limit(&self, spent_today: Decimal, amount: Amount) -> bool {
        spent_today + amount.value() <= self.daily_payment_limit
    }
}
