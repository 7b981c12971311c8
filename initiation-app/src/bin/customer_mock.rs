//! # Customer Mock
//!
//! Stand-in for the customer service that backs the Account Funds Oracle.
//! Serves a fixed set of customers and accounts.

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Debug, Clone, Serialize)]
struct Customer {
    id: &'static str,
    name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    id: &'static str,
    customer_id: &'static str,
    #[serde(rename = "type")]
    account_type: &'static str,
    iban: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
    currency: &'static str,
}

fn customers() -> Vec<Customer> {
    vec![
        Customer { id: "cust1", name: "Alice Smith" },
        Customer { id: "cust2", name: "Bob Jones" },
    ]
}

fn accounts() -> Vec<Account> {
    let account = |id, customer_id, account_type, iban, balance| Account {
        id,
        customer_id,
        account_type,
        iban,
        balance,
        currency: "GBP",
    };
    vec![
        account("acc1", "cust1", "Current", "GB00CUST1000000001", dec!(15000.00)),
        account("acc2", "cust1", "Savings", "GB00CUST1000000002", dec!(400.00)),
        account("acc3", "cust2", "Current", "GB00CUST2000000001", dec!(800.00)),
    ]
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn list_customers() -> Json<Vec<Customer>> {
    Json(customers())
}

async fn get_customer(Path(id): Path<String>) -> Response {
    match customers().into_iter().find(|c| c.id == id) {
        Some(customer) => Json(customer).into_response(),
        None => error(StatusCode::NOT_FOUND, "Not found"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountsQuery {
    customer_id: Option<String>,
}

async fn list_accounts(Query(query): Query<AccountsQuery>) -> Response {
    let Some(customer_id) = query.customer_id.filter(|c| !c.is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "customerId required");
    };
    let owned: Vec<_> = accounts()
        .into_iter()
        .filter(|a| a.customer_id == customer_id)
        .collect();
    Json(owned).into_response()
}

fn router() -> Router {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers/{id}", get(get_customer))
        .route("/accounts", get(list_accounts))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,customer_mock=debug".into()),
        )
        .init();

    let port: u16 = std::env::var("CUSTOMER_MOCK_PORT")
        .unwrap_or_else(|_| "4001".to_string())
        .parse()?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Customer mock listening on {}", listener.local_addr()?);

    axum::serve(listener, router()).await?;
    Ok(())
}
