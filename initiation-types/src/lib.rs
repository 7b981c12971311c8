//! # Initiation Types
//!
//! Domain types, business policies and port traits for the payment
//! initiation service. This crate has ZERO IO dependencies - only data
//! structures, pure decision rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal architecture:
//! - `domain/` - Payment instructions, account references, amounts
//! - `policy/` - Limit, fraud and scheme eligibility rules
//! - `ports/` - Traits the store and funds oracle adapters implement
//! - `dto/` - Request/response shapes for the HTTP boundary
//! - `error/` - Rejection, domain, repository and application errors

pub mod domain;
pub mod dto;
pub mod error;
pub mod policy;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    AccountRef, AccountType, Amount, CurrencyCode, CustomerAccount, PaymentId,
    PaymentInstruction, PaymentStatus,
};
pub use dto::*;
pub use error::{AppError, DomainError, LimitKind, PaymentRejection, RepoError};
pub use policy::{
    FraudScreen, LimitPolicy, PolicySet, PolicySettings, SchemeEligibility, ThresholdFraudScreen,
};
pub use ports::{FundsOracle, OracleError, PaymentStore};
