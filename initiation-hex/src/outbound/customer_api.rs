//! Account Funds Oracle backed by the customer service's HTTP API.

use async_trait::async_trait;
use reqwest::Client;

use initiation_types::{CustomerAccount, FundsOracle, OracleError};

/// Calls `GET {base_url}/accounts?customerId=<id>`.
///
/// No timeout is set here; `FundsChecker` bounds every call.
#[derive(Clone)]
pub struct HttpFundsOracle {
    base_url: String,
    http: Client,
}

impl HttpFundsOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FundsOracle for HttpFundsOracle {
    #[tracing::instrument(skip(self))]
    async fn accounts_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<CustomerAccount>, OracleError> {
        let resp = self
            .http
            .get(format!("{}/accounts", self.base_url))
            .query(&[("customerId", customer_id)])
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::Unavailable(format!(
                "customer service answered {}",
                status.as_u16()
            )));
        }

        resp.json::<Vec<CustomerAccount>>()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))
    }
}
