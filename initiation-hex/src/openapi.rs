//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use initiation_types::domain::{AccountRef, AccountType, PaymentId, PaymentStatus};
use initiation_types::dto::{
    ExecutionResponse, InitiatePaymentRequest, NotifyRequest, NotifyResponse,
    PaymentInitiationResponse, PaymentInitiationView,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Initiate a payment
///
/// Runs the daily limit, single limit, fraud, funds and scheme checks in that
/// order. The first failing check decides the error message.
#[utoipa::path(
    post,
    path = "/api/payment-initiations",
    tag = "payment-initiations",
    request_body = InitiatePaymentRequest,
    params(
        ("X-Client-Id" = Option<String>, Header, description = "Caller identity used for rate limiting")
    ),
    responses(
        (status = 201, description = "Payment instruction created as PENDING", body = PaymentInitiationResponse),
        (status = 400, description = "Invalid input or payment rejected", body = inline(serde_json::Value),
            example = json!({"error": "Exceeds single payment limit", "code": 400})),
        (status = 429, description = "Rate limit exceeded")
    )
)]
async fn initiate_payment() {}

/// List payment initiations, newest first
#[utoipa::path(
    get,
    path = "/api/payment-initiations",
    tag = "payment-initiations",
    responses(
        (status = 200, description = "All payment instructions", body = Vec<PaymentInitiationView>)
    )
)]
async fn list_payments() {}

/// Get a payment initiation by ID
#[utoipa::path(
    get,
    path = "/api/payment-initiations/{id}",
    tag = "payment-initiations",
    params(
        ("id" = String, Path, description = "Payment initiation ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment instruction", body = PaymentInitiationView),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// Execute a pending payment
#[utoipa::path(
    post,
    path = "/api/payment-initiations/{id}/execute",
    tag = "payment-initiations",
    params(
        ("id" = String, Path, description = "Payment initiation ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment completed", body = ExecutionResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not PENDING")
    )
)]
async fn execute_payment() {}

/// Notify a payment status
///
/// With no body the notification is only acknowledged. With a `status` the
/// payment is moved to that status.
#[utoipa::path(
    post,
    path = "/api/payment-initiations/{id}/notify",
    tag = "payment-initiations",
    params(
        ("id" = String, Path, description = "Payment initiation ID (UUID)")
    ),
    request_body(content = NotifyRequest, description = "Optional status update; may be omitted"),
    responses(
        (status = 200, description = "Notification received", body = NotifyResponse),
        (status = 400, description = "Malformed ID or body"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
async fn notify_payment() {}

/// OpenAPI documentation for the Payment Initiation API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payment Initiation API",
        version = "1.0.0",
        description = "Validates and records payment instructions, then tracks them from PENDING to COMPLETED or FAILED.\n\n## Rate limiting\n\nRequests are limited per `X-Client-Id` header value. Requests without the header share one quota.",
        license(name = "MIT"),
    ),
    paths(
        health,
        initiate_payment,
        list_payments,
        get_payment,
        execute_payment,
        notify_payment,
    ),
    components(
        schemas(
            InitiatePaymentRequest,
            PaymentInitiationResponse,
            PaymentInitiationView,
            ExecutionResponse,
            NotifyRequest,
            NotifyResponse,
            AccountRef,
            AccountType,
            PaymentId,
            PaymentStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payment-initiations", description = "Payment initiation and status tracking"),
    )
)]
pub struct ApiDoc;
