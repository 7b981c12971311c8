//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use initiation_types::{
    AppError, ExecutionResponse, FundsOracle, InitiatePaymentRequest, NotifyRequest,
    NotifyResponse, PaymentId, PaymentInitiationResponse, PaymentInitiationView, PaymentStore,
};

use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<S: PaymentStore, O: FundsOracle> {
    pub service: PaymentService<S, O>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) | AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<PaymentId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(AppError::BadRequest("Invalid payment initiation ID".into())))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Initiate a payment.
#[tracing::instrument(skip(state, payload))]
pub async fn initiate_payment<S: PaymentStore, O: FundsOracle>(
    State(state): State<Arc<AppState<S, O>>>,
    payload: Result<Json<InitiatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let payment = state.service.initiate(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentInitiationResponse::from(&payment)),
    ))
}

/// List all payment initiations, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_payments<S: PaymentStore, O: FundsOracle>(
    State(state): State<Arc<AppState<S, O>>>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list().await?;
    let views: Vec<PaymentInitiationView> = payments.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

/// Get a payment initiation by ID.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<S: PaymentStore, O: FundsOracle>(
    State(state): State<Arc<AppState<S, O>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.get(parse_id(&id)?).await?;
    Ok(Json(PaymentInitiationView::from(payment)))
}

/// Execute a pending payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn execute_payment<S: PaymentStore, O: FundsOracle>(
    State(state): State<Arc<AppState<S, O>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.execute(parse_id(&id)?).await?;
    Ok(Json(ExecutionResponse {
        payment_initiation_id: payment.id,
        status: payment.status,
        execution_date: Utc::now(),
    }))
}

/// Receive a scheme status notification.
///
/// An empty body is acknowledged without touching the payment.
#[tracing::instrument(skip(state, body), fields(payment_id = %id))]
pub async fn notify_payment<S: PaymentStore, O: FundsOracle>(
    State(state): State<Arc<AppState<S, O>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let status = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let req: NotifyRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid notification body: {e}")))?;
        Some(req.status)
    };

    let updated = state.service.notify(id, status).await?;
    Ok(Json(NotifyResponse::acknowledged(updated.map(|p| p.status))))
}
