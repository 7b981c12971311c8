//! Payment Store port trait.
//!
//! This is the primary persistence port in our hexagonal architecture.
//! Adapters (in-memory, SQLite, Postgres) implement this trait.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{PaymentId, PaymentInstruction, PaymentStatus};
use crate::error::RepoError;

/// Durable keyed storage for payment instructions.
///
/// Every operation is atomic per record; nothing here spans records.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    /// Inserts a new instruction. Fails with `Conflict` if the id exists.
    async fn insert(&self, instruction: &PaymentInstruction) -> Result<(), RepoError>;

    /// Gets an instruction by ID.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentInstruction>, RepoError>;

    /// Lists every instruction, newest first. Instructions created at the
    /// same instant come back latest-inserted first.
    async fn find_all_ordered_by_created_at_desc(
        &self,
    ) -> Result<Vec<PaymentInstruction>, RepoError>;

    /// Persists the instruction's new status, provided the stored status is
    /// still `expected`.
    ///
    /// Returns `NotFound` for an unknown id and `Conflict` when another
    /// writer changed the status first.
    async fn update(
        &self,
        instruction: &PaymentInstruction,
        expected: PaymentStatus,
    ) -> Result<(), RepoError>;

    /// Sums the amounts of the debtor's PENDING and COMPLETED instructions
    /// created at or after `since`.
    async fn sum_amount_for_debtor_since(
        &self,
        debtor_account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Decimal, RepoError>;
}
