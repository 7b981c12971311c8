//! Funds sufficiency check.
//!
//! Wraps a [`FundsOracle`] with a bounded timeout and collapses every
//! failure into "not sufficient". The orchestrator only ever sees a bool.

use std::time::Duration;

use initiation_types::{Amount, FundsOracle, OracleError};

/// Default bound on a single oracle call.
pub const DEFAULT_FUNDS_TIMEOUT: Duration = Duration::from_millis(2000);

pub struct FundsChecker<O: FundsOracle> {
    oracle: O,
    timeout: Duration,
}

impl<O: FundsOracle> FundsChecker<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_timeout(oracle, DEFAULT_FUNDS_TIMEOUT)
    }

    pub fn with_timeout(oracle: O, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// True when `account_id`, owned by `customer_id`, holds at least `amount`.
    ///
    /// Fails closed: an unknown account, an oracle error or a timeout all
    /// answer `false`.
    #[tracing::instrument(skip(self), fields(amount = %amount))]
    pub async fn has_sufficient_funds(
        &self,
        account_id: &str,
        amount: Amount,
        customer_id: &str,
    ) -> bool {
        let lookup = tokio::time::timeout(
            self.timeout,
            self.oracle.accounts_for_customer(customer_id),
        )
        .await
        .unwrap_or(Err(OracleError::Timeout(self.timeout)));

        match lookup {
            Ok(accounts) => match accounts.iter().find(|a| a.id == account_id) {
                Some(account) => account.balance >= amount.value(),
                None => {
                    tracing::debug!("Account not owned by customer");
                    false
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Funds check failed closed");
                false
            }
        }
    }
}
