//! In-memory Payment Store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use initiation_types::{PaymentId, PaymentInstruction, PaymentStatus, PaymentStore, RepoError};

/// Process-local store backed by an insertion-ordered vector.
///
/// Good for tests and for running the server without a database
/// (`DATABASE_URL=memory://`). Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    payments: RwLock<Vec<PaymentInstruction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert(&self, instruction: &PaymentInstruction) -> Result<(), RepoError> {
        let mut payments = self.payments.write().await;
        if payments.iter().any(|p| p.id == instruction.id) {
            return Err(RepoError::Conflict(format!(
                "Payment {} already exists",
                instruction.id
            )));
        }
        payments.push(instruction.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentInstruction>, RepoError> {
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all_ordered_by_created_at_desc(
        &self,
    ) -> Result<Vec<PaymentInstruction>, RepoError> {
        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut payments: Vec<_> = self.payments.read().await.iter().rev().cloned().collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn update(
        &self,
        instruction: &PaymentInstruction,
        expected: PaymentStatus,
    ) -> Result<(), RepoError> {
        let mut payments = self.payments.write().await;
        let stored = payments
            .iter_mut()
            .find(|p| p.id == instruction.id)
            .ok_or(RepoError::NotFound)?;

        if stored.status != expected {
            return Err(RepoError::Conflict(format!(
                "Payment {} is {}, expected {}",
                instruction.id, stored.status, expected
            )));
        }
        stored.status = instruction.status;
        Ok(())
    }

    async fn sum_amount_for_debtor_since(
        &self,
        debtor_account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Decimal, RepoError> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|p| p.debtor_account.account_id == debtor_account_id)
            .filter(|p| p.status != PaymentStatus::Failed)
            .filter(|p| p.created_at >= since)
            .map(|p| p.amount.value())
            .sum())
    }
}
