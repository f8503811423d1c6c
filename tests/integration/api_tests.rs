//! API integration tests against a running server
//!
//! Run with: cargo test --test api_tests -- --ignored

use chrono::{Months, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use ropey_server::models::AccessClaims;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Sign a token the way the identity provider does
fn auth_token() -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: "integration".to_string(),
        iss: "ropey".to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to sign token")
}

fn birth_date(years: u32) -> String {
    Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(years * 12))
        .expect("Date out of range")
        .format("%Y-%m-%d")
        .to_string()
}

async fn register(client: &Client, years: u32) -> reqwest::Response {
    client
        .post(format!("{}/members", BASE_URL))
        .bearer_auth(auth_token())
        .json(&json!({
            "first_name": "Integration",
            "last_name": "Tester",
            "address": "1 Test Road",
            "date_of_birth": birth_date(years),
            "membership_category": { "id": 0, "description": "Integration", "total_loans": 2 }
        }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/members", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_fetch_and_delete_member() {
    let client = Client::new();

    let response = register(&client, 30).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let member_id = body["id"].as_i64().expect("No member ID");

    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .bearer_auth(auth_token())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["member_name"], "Integration Tester");
    assert!(body["loans"].is_array());

    let response = client
        .delete(format!("{}/members?member_id={}", BASE_URL, member_id))
        .bearer_auth(auth_token())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .bearer_auth(auth_token())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_null());
}

#[tokio::test]
#[ignore]
async fn test_register_underage() {
    let client = Client::new();

    let response = register(&client, 10).await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_update_mismatch() {
    let client = Client::new();

    let response = client
        .put(format!("{}/members?member_id=1", BASE_URL))
        .bearer_auth(auth_token())
        .json(&json!({
            "id": 2,
            "category_id": 1,
            "first_name": "Wrong",
            "last_name": "Target",
            "address": "Nowhere",
            "date_of_birth": birth_date(40),
            "profile_image": null
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_reports() {
    let client = Client::new();

    for path in ["members/memberWithLoans", "members/nonActive", "members/forLoan", "categories", "producers"] {
        let response = client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(auth_token())
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success(), "GET {} failed", path);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert!(body.is_array());
    }
}
