//! Account Funds Oracle port.
//!
//! The oracle reports balances for a customer's accounts. It lives on the
//! other side of a network hop, so every call may fail.

use std::time::Duration;

use crate::domain::CustomerAccount;

/// Error type for oracle lookups.
///
/// Never surfaces to callers of the orchestrator: the funds check collapses
/// every variant into an insufficient-funds decision.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected oracle response: {0}")]
    InvalidResponse(String),
}

/// Port trait for the Account Funds Oracle.
#[async_trait::async_trait]
pub trait FundsOracle: Send + Sync + 'static {
    /// Lists the accounts owned by `customer_id`, with current balances.
    async fn accounts_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<CustomerAccount>, OracleError>;
}
