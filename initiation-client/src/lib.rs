//! # Initiation Client SDK
//!
//! A typed Rust client for the Payment Initiation API.

use initiation_types::{
    ExecutionResponse, InitiatePaymentRequest, NotifyRequest, NotifyResponse, PaymentId,
    PaymentInitiationResponse, PaymentInitiationView, PaymentStatus,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Payment Initiation API client.
pub struct InitiationClient {
    base_url: String,
    client_id: Option<String>,
    http: Client,
}

impl InitiationClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: None,
            http: Client::new(),
        }
    }

    /// Sets the `X-Client-Id` sent with every request (shows up in server logs).
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Initiates a payment.
    pub async fn initiate(
        &self,
        req: &InitiatePaymentRequest,
    ) -> Result<PaymentInitiationResponse, ClientError> {
        self.post("/api/payment-initiations", Some(req)).await
    }

    /// Gets a payment initiation by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentInitiationView, ClientError> {
        self.get(&format!("/api/payment-initiations/{}", id)).await
    }

    /// Lists all payment initiations, newest first.
    pub async fn list_payments(&self) -> Result<Vec<PaymentInitiationView>, ClientError> {
        self.get("/api/payment-initiations").await
    }

    /// Executes a pending payment.
    pub async fn execute(&self, id: PaymentId) -> Result<ExecutionResponse, ClientError> {
        self.post::<_, ()>(&format!("/api/payment-initiations/{}/execute", id), None)
            .await
    }

    /// Sends a status notification; `None` only asks for an acknowledgment.
    pub async fn notify(
        &self,
        id: PaymentId,
        status: Option<PaymentStatus>,
    ) -> Result<NotifyResponse, ClientError> {
        let path = format!("/api/payment-initiations/{}/notify", id);
        let body = status.map(|status| NotifyRequest { status });
        self.post(&path, body.as_ref()).await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(id) = &self.client_id {
            req = req.header("X-Client-Id", id);
        }
        req
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self.request(reqwest::Method::POST, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
