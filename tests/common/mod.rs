#![allow(dead_code)]

use serde_json::{Value, json};
use slapfiliate::config::{PaypalConfig, TapfiliateConfig};
use slapfiliate::infrastructure::paypal::PaypalClient;
use slapfiliate::infrastructure::tapfiliate::TapfiliateClient;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "tap-key";
pub const CLIENT_ID: &str = "lameusername";
pub const SECRET: &str = "areallybadpassword";
pub const BASIC_AUTH: &str = "Basic bGFtZXVzZXJuYW1lOmFyZWFsbHliYWRwYXNzd29yZA==";
pub const TOKEN: &str = "1up";

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn tapfiliate(server: &MockServer) -> TapfiliateClient {
    tapfiliate_with_timeout(server, TIMEOUT)
}

pub fn tapfiliate_with_timeout(server: &MockServer, timeout: Duration) -> TapfiliateClient {
    let config = TapfiliateConfig {
        base_url: server.uri(),
        api_key: API_KEY.to_string(),
    };
    TapfiliateClient::new(&config, timeout).unwrap()
}

pub fn paypal(server: &MockServer) -> PaypalClient {
    paypal_with_timeout(server, TIMEOUT)
}

pub fn paypal_with_timeout(server: &MockServer, timeout: Duration) -> PaypalClient {
    let config = PaypalConfig {
        host: server.uri(),
        client_id: CLIENT_ID.to_string(),
        secret: SECRET.to_string(),
    };
    PaypalClient::new(&config, timeout).unwrap()
}

pub async fn mount_balances(server: &MockServer, balances: Value) {
    Mock::given(method("GET"))
        .and(path("/balances/"))
        .and(header("api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(balances))
        .mount(server)
        .await;
}

pub async fn mount_primary_method(server: &MockServer, affiliate_id: &str, email: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/affiliates/{affiliate_id}/payout-methods/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "title": "Paypal",
            "id": "paypal",
            "details": { "paypal_address": email },
            "primary": true
        }])))
        .mount(server)
        .await;
}

pub async fn mount_payment(server: &MockServer, affiliate_id: &str, amount: Value) {
    Mock::given(method("POST"))
        .and(path("/payments/"))
        .and(body_partial_json(json!({ "affiliate_id": affiliate_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": format!("payment-{affiliate_id}"),
            "created_at": "2000-12-31",
            "affiliate": { "id": affiliate_id },
            "amount": amount
        }])))
        .mount(server)
        .await;
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .and(header("authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scope": "https://uri.paypal.com/services/payouts",
            "access_token": TOKEN,
            "token_type": "Bearer",
            "expires_in": 32400
        })))
        .mount(server)
        .await;
}

pub async fn mount_batch(server: &MockServer, batch_id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/payments/payouts"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "batch_header": {
                "sender_batch_header": { "sender_batch_id": "Payouts_2000" },
                "payout_batch_id": batch_id,
                "batch_status": "PENDING"
            }
        })))
        .mount(server)
        .await;
}

/// JSON bodies of every request the server saw on `route`.
pub async fn bodies(server: &MockServer, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == route)
        .filter_map(|request| request.body_json::<Value>().ok())
        .collect()
}
