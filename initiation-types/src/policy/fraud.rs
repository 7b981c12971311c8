use rust_decimal::Decimal;

use crate::domain::Amount;

/// Seam for fraud screening.
///
/// The orchestrator only asks a yes/no question, so a scoring model can be
/// plugged in without touching the pipeline.
pub trait FraudScreen: Send + Sync {
    fn is_risky(&self, amount: Amount, debtor_account_id: &str, creditor_account_id: &str)
    -> bool;
}

/// Flags any payment strictly above a fixed high-value threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFraudScreen {
    threshold: Decimal,
}

impl ThresholdFraudScreen {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }
}

impl FraudScreen for ThresholdFraudScreen {
    fn is_risky(&self, amount: Amount, _debtor: &str, _creditor: &str) -> bool {
        amount.value() > self.threshold
    }
}
