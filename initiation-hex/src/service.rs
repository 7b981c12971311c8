//! Payment Orchestrator
//!
//! Runs the ordered validation pipeline and owns the status state machine.
//! Talks to the outside world only through the store and oracle ports.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use initiation_types::{
    Amount, AppError, CurrencyCode, FundsOracle, InitiatePaymentRequest, LimitKind, PaymentId,
    PaymentInstruction, PaymentRejection, PaymentStatus, PaymentStore, PolicySet, RepoError,
};

use crate::funds::FundsChecker;

/// Where the daily limit check gets "already spent today" from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DailyTotalSource {
    /// Always zero: each payment is compared to the daily ceiling alone.
    #[default]
    None,
    /// Sum of the debtor's non-failed instructions created since 00:00 UTC.
    Store,
}

impl FromStr for DailyTotalSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "store" => Ok(Self::Store),
            other => Err(format!("Unknown daily total source: {other}")),
        }
    }
}

/// Application service for payment initiation.
///
/// Generic over the store and oracle ports; adapters are injected at
/// construction and there is no global state.
pub struct PaymentService<S: PaymentStore, O: FundsOracle> {
    store: S,
    funds: FundsChecker<O>,
    policies: PolicySet,
    daily_totals: DailyTotalSource,
    /// Serializes daily-check-then-insert per debtor account.
    debtor_gates: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: PaymentStore, O: FundsOracle> PaymentService<S, O> {
    pub fn new(store: S, funds: FundsChecker<O>, policies: PolicySet) -> Self {
        Self {
            store,
            funds,
            policies,
            daily_totals: DailyTotalSource::default(),
            debtor_gates: DashMap::new(),
        }
    }

    pub fn with_daily_totals(mut self, source: DailyTotalSource) -> Self {
        self.daily_totals = source;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    #[cfg(test)]
    pub(crate) fn open_debtor_gates(&self) -> usize {
        self.debtor_gates.len()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Initiation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validates a request and, when every check passes, stores a new
    /// PENDING instruction.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// daily limit, single limit, fraud, funds, scheme eligibility.
    #[tracing::instrument(
        skip(self, req),
        fields(debtor = %req.debtor_account.account_id, amount = %req.amount)
    )]
    pub async fn initiate(
        &self,
        req: InitiatePaymentRequest,
    ) -> Result<PaymentInstruction, AppError> {
        let amount = Amount::new(req.amount)?;
        let currency = CurrencyCode::new(&req.currency)?;

        if req.debtor_account.account_id.trim().is_empty() {
            return Err(AppError::BadRequest("Debtor account id is required".into()));
        }
        if req.creditor_account.account_id.trim().is_empty() {
            return Err(AppError::BadRequest("Creditor account id is required".into()));
        }
        let customer_id = req
            .debtor_account
            .customer_id
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Debtor customer id is required".into()))?;

        let gate = DebtorGate::acquire(&self.debtor_gates, &req.debtor_account.account_id);
        let _guard = gate.lock().await;
        self.validate_and_store(req, amount, currency, &customer_id)
            .await
    }

    async fn validate_and_store(
        &self,
        req: InitiatePaymentRequest,
        amount: Amount,
        currency: CurrencyCode,
        customer_id: &str,
    ) -> Result<PaymentInstruction, AppError> {
        let debtor_id = req.debtor_account.account_id.as_str();
        let creditor_id = req.creditor_account.account_id.as_str();
        let limits = &self.policies.limits;

        let spent_today = self.spent_today(debtor_id).await?;
        if !limits.within_daily_limit(spent_today, amount) {
            return Err(reject(PaymentRejection::LimitExceeded(LimitKind::Daily)));
        }

        if !limits.within_single_limit(amount) {
            return Err(reject(PaymentRejection::LimitExceeded(LimitKind::Single)));
        }

        if self.policies.fraud.is_risky(amount, debtor_id, creditor_id) {
            return Err(reject(PaymentRejection::FraudFlagged));
        }

        if !self
            .funds
            .has_sufficient_funds(debtor_id, amount, customer_id)
            .await
        {
            return Err(reject(PaymentRejection::InsufficientFunds));
        }

        if !self.policies.scheme.is_eligible(&currency, amount) {
            return Err(reject(PaymentRejection::SchemeIneligible));
        }

        let payment = PaymentInstruction::new(
            req.debtor_account,
            req.creditor_account,
            amount,
            currency,
            req.reference,
            req.requested_execution_date,
        );
        self.store.insert(&payment).await?;

        tracing::info!(payment_id = %payment.id, "Payment initiated");
        Ok(payment)
    }

    async fn spent_today(&self, debtor_id: &str) -> Result<Decimal, AppError> {
        match self.daily_totals {
            DailyTotalSource::None => Ok(Decimal::ZERO),
            DailyTotalSource::Store => Ok(self
                .store
                .sum_amount_for_debtor_since(debtor_id, start_of_day(Utc::now()))
                .await?),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment instruction by ID.
    pub async fn get(&self, id: PaymentId) -> Result<PaymentInstruction, AppError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| not_found(id)))
    }

    /// Lists all payment instructions, newest first.
    pub async fn list(&self) -> Result<Vec<PaymentInstruction>, AppError> {
        self.store
            .find_all_ordered_by_created_at_desc()
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Status transitions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Moves a payment to `target` if the transition table allows it.
    ///
    /// The write only lands if the stored status is still the one read here;
    /// a concurrent writer that got there first turns this into a conflict.
    #[tracing::instrument(skip(self), fields(payment_id = %id, to = %target))]
    pub async fn transition(
        &self,
        id: PaymentId,
        target: PaymentStatus,
    ) -> Result<PaymentInstruction, AppError> {
        let mut payment = self.get(id).await?;
        let previous = payment.status;

        payment.transition_to(target).inspect_err(|e| {
            tracing::warn!(error = %e, "Transition refused");
        })?;

        self.store
            .update(&payment, previous)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => not_found(id),
                other => other.into(),
            })?;

        tracing::info!(from = %previous, to = %target, "Payment status changed");
        Ok(payment)
    }

    /// Marks a payment as executed.
    pub async fn execute(&self, id: PaymentId) -> Result<PaymentInstruction, AppError> {
        self.transition(id, PaymentStatus::Completed).await
    }

    /// Handles a scheme status notification.
    ///
    /// Without a status this is an acknowledgment and touches nothing.
    pub async fn notify(
        &self,
        id: PaymentId,
        status: Option<PaymentStatus>,
    ) -> Result<Option<PaymentInstruction>, AppError> {
        match status {
            None => {
                tracing::debug!(payment_id = %id, "Notification acknowledged");
                Ok(None)
            }
            Some(target) => self.transition(id, target).await.map(Some),
        }
    }
}

/// A debtor's slot in the gate map.
///
/// The map entry is removed when the last holder drops, including when the
/// initiate future is cancelled mid-flight.
struct DebtorGate<'a> {
    gates: &'a DashMap<String, Arc<Mutex<()>>>,
    debtor_id: String,
    lock: Arc<Mutex<()>>,
}

impl<'a> DebtorGate<'a> {
    fn acquire(gates: &'a DashMap<String, Arc<Mutex<()>>>, debtor_id: &str) -> Self {
        let lock = gates.entry(debtor_id.to_string()).or_default().clone();
        Self {
            gates,
            debtor_id: debtor_id.to_string(),
            lock,
        }
    }

    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for DebtorGate<'_> {
    fn drop(&mut self) {
        // Two references left: ours and the map's.
        self.gates
            .remove_if(&self.debtor_id, |_, g| Arc::strong_count(g) == 2);
    }
}

fn reject(rejection: PaymentRejection) -> AppError {
    tracing::warn!(reason = %rejection, "Payment rejected");
    AppError::Rejected(rejection)
}

fn not_found(id: PaymentId) -> AppError {
    AppError::NotFound(format!("Payment {}", id))
}

/// 00:00 UTC on the day of `now`.
pub(crate) fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
