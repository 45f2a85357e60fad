mod common;

use rust_decimal_macros::dec;
use serde_json::json;
use slapfiliate::application::settlement::{NOTHING_TO_PAY, Settlement, SettlementReport};
use slapfiliate::domain::affiliate::Balance;
use slapfiliate::domain::policy::{RunMode, SettlementPolicy};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn production(floor: Option<Balance>) -> SettlementPolicy {
    let policy = SettlementPolicy::new(RunMode::Production);
    match floor {
        Some(floor) => policy.with_pay_floor(floor),
        None => policy,
    }
}

fn pipeline(tap: &MockServer, paypal: &MockServer, policy: SettlementPolicy) -> Settlement {
    Settlement::new(
        Box::new(common::tapfiliate(tap)),
        Box::new(common::paypal(paypal)),
        policy,
    )
}

#[tokio::test]
async fn test_settles_affiliate_above_floor() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(
        &tap,
        json!([
            { "affiliate_id": "x", "balances": { "USD": 5 } },
            { "affiliate_id": "y", "balances": { "USD": 1 } }
        ]),
    )
    .await;
    common::mount_primary_method(&tap, "x", "e@x.com").await;
    common::mount_payment(&tap, "x", json!(5)).await;
    common::mount_token(&paypal).await;
    common::mount_batch(&paypal, "B1").await;

    let report = pipeline(&tap, &paypal, production(Some(Balance::new(dec!(2)))))
        .run()
        .await
        .unwrap();

    assert_eq!(report.lines(), vec!["2000-12-31 : x paid 5 (B1)"]);

    let batches = common::bodies(&paypal, "/v1/payments/payouts").await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["items"].as_array().unwrap().len(), 1);
    assert_eq!(batches[0]["items"][0]["receiver"], "e@x.com");
    assert_eq!(batches[0]["items"][0]["amount"]["value"], "5.00");

    let payments = common::bodies(&tap, "/payments/").await;
    assert_eq!(
        payments,
        vec![json!({ "affiliate_id": "x", "amount": 5.0, "currency": "USD" })]
    );
}

#[tokio::test]
async fn test_nothing_to_pay_skips_payments_api() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(&tap, json!([{ "affiliate_id": "nomethod", "balances": { "USD": 9 } }]))
        .await;
    Mock::given(method("GET"))
        .and(path("/affiliates/nomethod/payout-methods/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&tap)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&paypal)
        .await;

    let report = pipeline(&tap, &paypal, production(None)).run().await.unwrap();

    assert_eq!(report, SettlementReport::NothingToPay);
    assert_eq!(report.lines(), vec![NOTHING_TO_PAY]);
}

#[tokio::test]
async fn test_failed_lookup_drops_only_that_affiliate() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(
        &tap,
        json!([
            { "affiliate_id": "broken", "balances": { "USD": 40 } },
            { "affiliate_id": "fine", "balances": { "USD": 20 } }
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/affiliates/broken/payout-methods/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&tap)
        .await;
    common::mount_primary_method(&tap, "fine", "fine@email.com").await;
    common::mount_payment(&tap, "fine", json!(20)).await;
    common::mount_token(&paypal).await;
    common::mount_batch(&paypal, "B7").await;

    let report = pipeline(&tap, &paypal, production(None)).run().await.unwrap();

    assert_eq!(report.lines(), vec!["2000-12-31 : fine paid 20 (B7)"]);
}

#[tokio::test]
async fn test_partial_write_back_failure_keeps_every_line() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(
        &tap,
        json!([
            { "affiliate_id": "a", "balances": { "USD": 10 } },
            { "affiliate_id": "b", "balances": { "USD": 8 } }
        ]),
    )
    .await;
    common::mount_primary_method(&tap, "a", "a@email.com").await;
    common::mount_primary_method(&tap, "b", "b@email.com").await;
    common::mount_payment(&tap, "a", json!(10)).await;
    Mock::given(method("POST"))
        .and(path("/payments/"))
        .and(body_partial_json(json!({ "affiliate_id": "b" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&tap)
        .await;
    common::mount_token(&paypal).await;
    common::mount_batch(&paypal, "B1").await;

    let report = pipeline(&tap, &paypal, production(None)).run().await.unwrap();

    assert_eq!(
        report.lines(),
        vec!["2000-12-31 : a paid 10 (B1)", "Failed to post payment"]
    );
}

#[tokio::test]
async fn test_balance_failure_aborts_before_payouts() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/balances/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&tap)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&paypal)
        .await;

    let err = pipeline(&tap, &paypal, production(None)).run().await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch tapfiliate balances: status 503");
}

#[tokio::test]
async fn test_batch_failure_aborts_before_write_back() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(&tap, json!([{ "affiliate_id": "x", "balances": { "USD": 5 } }])).await;
    common::mount_primary_method(&tap, "x", "e@x.com").await;
    Mock::given(method("POST"))
        .and(path("/payments/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tap)
        .await;
    common::mount_token(&paypal).await;
    Mock::given(method("POST"))
        .and(path("/v1/payments/payouts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&paypal)
        .await;

    let err = pipeline(&tap, &paypal, production(None)).run().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Error posting batch payouts: 500 at {}/v1/payments/payouts", paypal.uri())
    );
}

#[tokio::test]
async fn test_staging_pays_only_the_test_account() {
    let tap = MockServer::start().await;
    let paypal = MockServer::start().await;
    common::mount_balances(&tap, json!([{ "affiliate_id": "real", "balances": { "USD": 250 } }]))
        .await;
    common::mount_primary_method(&tap, "real", "real@customer.com").await;
    common::mount_payment(&tap, "stager", json!(1.02)).await;
    common::mount_token(&paypal).await;
    common::mount_batch(&paypal, "B5").await;

    let mode = RunMode::staging("stager".into(), "staging@email.com".into());
    let report = pipeline(&tap, &paypal, SettlementPolicy::new(mode))
        .run()
        .await
        .unwrap();

    assert_eq!(report.lines(), vec!["2000-12-31 : stager paid 1.02 (B5)"]);
    let batches = common::bodies(&paypal, "/v1/payments/payouts").await;
    let receivers: Vec<_> = batches[0]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["receiver"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(receivers, vec!["staging@email.com"]);
}
