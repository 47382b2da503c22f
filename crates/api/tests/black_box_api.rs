use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use corpcredit_auth::{Claims, Hs256TokenCodec, Role};
use corpcredit_core::AccountId;
use corpcredit_infra::InMemoryLedgerStore;
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, but an in-memory store and an ephemeral port.
        let store = Arc::new(InMemoryLedgerStore::new());
        let app = corpcredit_api::app::build_app_with_store(JWT_SECRET, store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: AccountId, role: Role) -> String {
    let codec = Hs256TokenCodec::new(JWT_SECRET.as_bytes());
    let claims = Claims::new(sub, role, Utc::now(), ChronoDuration::minutes(10));
    codec.encode(&claims).expect("failed to encode jwt")
}

async fn create_account(
    client: &reqwest::Client,
    base_url: &str,
    admin_token: &str,
    username: &str,
    role: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/accounts"))
        .bearer_auth(admin_token)
        .json(&json!({ "username": username, "role": role }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_open_and_domain_routes_require_auth() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/accounts", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn funding_and_payment_happy_path() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = mint_jwt(AccountId::new(), Role::Admin);

    let employee = create_account(&client, &server.base_url, &admin_token, "alice", "employee").await;
    let vendor = create_account(&client, &server.base_url, &admin_token, "shopx", "vendor").await;
    let employee_id: AccountId = employee["id"].as_str().unwrap().parse().unwrap();

    // Admin funds the employee wallet.
    let res = client
        .post(format!("{}/admin/wallet", server.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "account_id": employee["id"], "amount": "100.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let funded: serde_json::Value = res.json().await.unwrap();
    assert_eq!(funded["balance"], "100.00");

    // Employee pays the vendor.
    let employee_token = mint_jwt(employee_id, Role::Employee);
    let res = client
        .post(format!("{}/employee/pay", server.base_url))
        .bearer_auth(&employee_token)
        .json(&json!({ "vendor_id": vendor["id"], "amount": "40.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let transaction: serde_json::Value = res.json().await.unwrap();
    assert_eq!(transaction["amount"], "40.00");
    assert_eq!(transaction["status"], "completed");
    assert_eq!(transaction["payee_id"], vendor["id"]);

    // Balance reflects the debit; history shows exactly one row on each side.
    let res = client
        .get(format!("{}/employee/transactions", server.base_url))
        .bearer_auth(&employee_token)
        .send()
        .await
        .unwrap();
    let rows: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["transaction_id"], transaction["transaction_id"]);

    let vendor_token = mint_jwt(vendor["id"].as_str().unwrap().parse().unwrap(), Role::Vendor);
    let res = client
        .get(format!("{}/vendor/transactions", server.base_url))
        .bearer_auth(&vendor_token)
        .send()
        .await
        .unwrap();
    let rows: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(rows.len(), 1);

    let res = client
        .get(format!("{}/accounts", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let accounts: Vec<serde_json::Value> = res.json().await.unwrap();
    let alice = accounts
        .iter()
        .find(|a| a["username"] == "alice")
        .unwrap();
    assert_eq!(alice["balance"], "60.00");
}

#[tokio::test]
async fn overspending_is_a_structured_rejection() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = mint_jwt(AccountId::new(), Role::Admin);

    let employee = create_account(&client, &server.base_url, &admin_token, "bob", "employee").await;
    let vendor = create_account(&client, &server.base_url, &admin_token, "cafe", "vendor").await;
    let employee_token = mint_jwt(employee["id"].as_str().unwrap().parse().unwrap(), Role::Employee);

    let res = client
        .post(format!("{}/employee/pay", server.base_url))
        .bearer_auth(&employee_token)
        .json(&json!({ "vendor_id": vendor["id"], "amount": "40.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_balance");

    // Nothing was recorded.
    let res = client
        .get(format!("{}/employee/transactions", server.base_url))
        .bearer_auth(&employee_token)
        .send()
        .await
        .unwrap();
    let rows: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let employee_token = mint_jwt(AccountId::new(), Role::Employee);

    let res = client
        .post(format!("{}/admin/wallet", server.base_url))
        .bearer_auth(&employee_token)
        .json(&json!({ "account_id": AccountId::new(), "amount": "10.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/accounts", server.base_url))
        .bearer_auth(&employee_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bulk_reset_and_windowed_audit_log() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = mint_jwt(AccountId::new(), Role::Admin);

    create_account(&client, &server.base_url, &admin_token, "e1", "employee").await;
    create_account(&client, &server.base_url, &admin_token, "e2", "employee").await;

    let res = client
        .post(format!("{}/admin/wallet/reset", server.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "employee", "balance": "25.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["updated"], 2);

    // A window entirely in the future matches nothing.
    let future = (Utc::now() + ChronoDuration::hours(1)).to_rfc3339();
    let res = client
        .get(format!("{}/admin/transactions", server.base_url))
        .query(&[("from", future)])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rows: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = mint_jwt(AccountId::new(), Role::Admin);

    create_account(&client, &server.base_url, &admin_token, "dup", "employee").await;
    let res = client
        .post(format!("{}/accounts", server.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "username": "dup", "role": "vendor" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
