//! Payment instruction domain model and its status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::AccountRef;
use super::money::{Amount, CurrencyCode};
use crate::error::DomainError;

/// Unique identifier for a PaymentInstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle status of a payment instruction.
///
/// `Pending` is only ever assigned at creation. `Completed` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// The allowed-transition table.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "Unknown payment status: {other}"
            ))),
        }
    }
}

/// The persisted record of a requested payment and its lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstruction {
    /// Unique identifier
    pub id: PaymentId,
    /// Source of funds
    pub debtor_account: AccountRef,
    /// Destination of funds
    pub creditor_account: AccountRef,
    pub amount: Amount,
    pub currency: CurrencyCode,
    /// Free text, not validated for content
    pub reference: Option<String>,
    pub requested_execution_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    /// When the instruction was created
    pub created_at: DateTime<Utc>,
}

impl PaymentInstruction {
    /// Creates a new PENDING instruction with a fresh id and creation time.
    pub fn new(
        debtor_account: AccountRef,
        creditor_account: AccountRef,
        amount: Amount,
        currency: CurrencyCode,
        reference: Option<String>,
        requested_execution_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            debtor_account,
            creditor_account,
            amount,
            currency,
            reference,
            requested_execution_date,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs an instruction from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        debtor_account: AccountRef,
        creditor_account: AccountRef,
        amount: Amount,
        currency: CurrencyCode,
        reference: Option<String>,
        requested_execution_date: Option<NaiveDate>,
        status: PaymentStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            debtor_account,
            creditor_account,
            amount,
            currency,
            reference,
            requested_execution_date,
            status,
            created_at,
        }
    }

    /// Moves the instruction to `next`, enforcing the transition table.
    pub fn transition_to(&mut self, next: PaymentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
