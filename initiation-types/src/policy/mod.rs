//! Business policies applied before a payment instruction is persisted.
//!
//! Every policy is a pure function of its inputs and its configured
//! thresholds. Thresholds are injected through [`PolicySettings`] so they can
//! be tuned per deployment and per test.

mod fraud;
mod limits;
mod scheme;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::CurrencyCode;
use crate::error::DomainError;

pub use fraud::{FraudScreen, ThresholdFraudScreen};
pub use limits::LimitPolicy;
pub use scheme::SchemeEligibility;

/// Threshold values for the built-in policies.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySettings {
    pub single_payment_limit: Decimal,
    pub daily_payment_limit: Decimal,
    pub fraud_threshold: Decimal,
    pub scheme_currency: String,
    pub scheme_max_amount: Decimal,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            single_payment_limit: dec!(500),
            daily_payment_limit: dec!(2000),
            fraud_threshold: dec!(10000),
            scheme_currency: "GBP".to_string(),
            scheme_max_amount: dec!(250000),
        }
    }
}

/// The four-policy bundle the orchestrator runs (the funds check lives with
/// the orchestrator because it needs IO).
#[derive(Clone)]
pub struct PolicySet {
    pub limits: LimitPolicy,
    pub fraud: Arc<dyn FraudScreen>,
    pub scheme: SchemeEligibility,
}

impl PolicySet {
    /// Builds the reference policies from settings.
    pub fn from_settings(settings: &PolicySettings) -> Result<Self, DomainError> {
        let currency = CurrencyCode::new(&settings.scheme_currency)?;
        Ok(Self::with_scheme_currency(settings, currency))
    }

    fn with_scheme_currency(settings: &PolicySettings, currency: CurrencyCode) -> Self {
        Self {
            limits: LimitPolicy::new(
                settings.single_payment_limit,
                settings.daily_payment_limit,
            ),
            fraud: Arc::new(ThresholdFraudScreen::new(settings.fraud_threshold)),
            scheme: SchemeEligibility::new(currency, settings.scheme_max_amount),
        }
    }

    /// Swaps in a different fraud screen.
    pub fn with_fraud_screen(mut self, fraud: Arc<dyn FraudScreen>) -> Self {
        self.fraud = fraud;
        self
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        // The default settings name GBP, which needs no validation.
        Self::with_scheme_currency(&PolicySettings::default(), CurrencyCode::gbp())
    }
}
