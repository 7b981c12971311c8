//! Error types for the payment initiation service.

use crate::domain::PaymentStatus;

/// Which configured ceiling a payment broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Single,
    Daily,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Single => write!(f, "single"),
            LimitKind::Daily => write!(f, "daily"),
        }
    }
}

/// Business-rule rejections raised by the initiation pipeline.
///
/// Each variant is a final decision: nothing was persisted and the core
/// does not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRejection {
    #[error("Exceeds {0} payment limit")]
    LimitExceeded(LimitKind),

    #[error("Payment flagged as potentially fraudulent")]
    FraudFlagged,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Not eligible for Faster Payments")]
    SchemeIneligible,
}

/// Domain-level errors (invariant violations and bad input).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount cannot have more than two decimal places")]
    AmountPrecision,

    #[error("Amount exceeds the maximum supported value")]
    AmountTooLarge,

    #[error("Currency must be a 3-letter ISO code, got {0:?}")]
    InvalidCurrency(String),

    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Rejected(#[from] PaymentRejection),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidTransition { from, to } => AppError::InvalidTransition { from, to },
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}
