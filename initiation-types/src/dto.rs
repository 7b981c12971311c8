//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Field names follow the camelCase payment-initiation resource shape.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountRef, Amount, CurrencyCode, PaymentId, PaymentInstruction, PaymentStatus};

// ─────────────────────────────────────────────────────────────────────────────
// Initiation
// ─────────────────────────────────────────────────────────────────────────────

/// Request to initiate a payment.
///
/// `amount` and `currency` arrive unvalidated; the service turns them into
/// domain values and rejects bad input with a 400.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    /// Source of funds; must carry `customerId`
    pub debtor_account: AccountRef,
    /// Destination of funds
    pub creditor_account: AccountRef,
    /// Amount in major units, at most two decimal places
    #[schema(value_type = f64, example = 10.5)]
    pub amount: Decimal,
    #[schema(example = "GBP")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Test payment")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-06-01")]
    pub requested_execution_date: Option<NaiveDate>,
}

/// Response after a payment instruction is created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiationResponse {
    pub payment_initiation_id: PaymentId,
    pub status: PaymentStatus,
    pub creation_date: DateTime<Utc>,
}

impl From<&PaymentInstruction> for PaymentInitiationResponse {
    fn from(payment: &PaymentInstruction) -> Self {
        Self {
            payment_initiation_id: payment.id,
            status: payment.status,
            creation_date: payment.created_at,
        }
    }
}

/// Full view of a stored payment instruction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiationView {
    pub payment_initiation_id: PaymentId,
    pub status: PaymentStatus,
    #[schema(value_type = String, example = "10.50")]
    pub amount: Amount,
    #[schema(value_type = String, example = "GBP")]
    pub currency: CurrencyCode,
    pub debtor_account: AccountRef,
    pub creditor_account: AccountRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub requested_execution_date: Option<NaiveDate>,
    pub creation_date: DateTime<Utc>,
}

impl From<PaymentInstruction> for PaymentInitiationView {
    fn from(payment: PaymentInstruction) -> Self {
        Self {
            payment_initiation_id: payment.id,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency,
            debtor_account: payment.debtor_account,
            creditor_account: payment.creditor_account,
            reference: payment.reference,
            requested_execution_date: payment.requested_execution_date,
            creation_date: payment.created_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status updates
// ─────────────────────────────────────────────────────────────────────────────

/// Response after executing a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub payment_initiation_id: PaymentId,
    pub status: PaymentStatus,
    pub execution_date: DateTime<Utc>,
}

/// Optional body of a status notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    /// Status reported by the scheme
    pub status: PaymentStatus,
}

/// Acknowledgment of a status notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    #[schema(example = "Notification received")]
    pub message: String,
    /// Set when the notification moved the payment to a new status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

impl NotifyResponse {
    pub const MESSAGE: &'static str = "Notification received";

    pub fn acknowledged(status: Option<PaymentStatus>) -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            status,
        }
    }
}
