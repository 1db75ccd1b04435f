//! Integration tests for order placement and conversion tracking.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use ai_store_client::experiment::{
    CheckoutButton, Decision, ExperimentUser, ORDER_PLACED_EVENT, StaticDecisions, flags,
};
use ai_store_client::notify::messages;
use ai_store_core::OrderId;
use ai_store_integration_tests::{TestContext, cart_line, order};

const ALICE: &str = r#"{"email":"a@b.com","name":"A","country":"KR"}"#;

async fn with_cart(ctx: &TestContext) {
    ctx.mount_products(json!([])).await;
    ctx.mount_cart("a@b.com", json!([cart_line("p1", 1500, 2), cart_line("p2", 700, 1)]))
        .await;
    ctx.mount_orders("a@b.com", json!([order("o-7", 3700, "processing")])).await;
    ctx.store.refresh_all(None).await;
}

fn button_from_flag() -> CheckoutButton {
    let mut variables = serde_json::Map::new();
    variables.insert("CHECKOUT_BUTTONS".to_string(), json!("Buy it now"));
    let decisions = StaticDecisions::new().with(
        flags::APP_RULE1,
        Decision {
            enabled: true,
            variation_key: Some("variation_b".to_string()),
            variables,
        },
    );
    let user = ExperimentUser::from_identity(None);
    CheckoutButton::resolve(&decisions, &user)
}

async fn mount_place_order(ctx: &TestContext, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({"email": "a@b.com"})))
        .respond_with(response)
        .expect(1)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_checkout_places_order_and_resyncs() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "orderId": "o-7"})),
    )
    .await;

    let placed = ctx.store.checkout(None).await.unwrap();

    assert_eq!(placed.order_id, Some(OrderId::new("o-7")));
    assert_eq!(ctx.requests("GET", "/cart").await, 2);
    assert_eq!(ctx.requests("GET", "/orders").await, 2);
    assert!(ctx.events.events().is_empty());
}

#[tokio::test]
async fn test_order_without_id_still_resyncs() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": true})),
    )
    .await;

    let placed = ctx.store.checkout(None).await.unwrap();

    assert_eq!(placed.order_id, None);
    assert_eq!(ctx.requests("GET", "/cart").await, 2);
    assert_eq!(ctx.requests("GET", "/orders").await, 2);
    assert!(ctx.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_checkout_tracks_button_state() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "orderId": "o-8"})),
    )
    .await;

    let button = button_from_flag();
    assert_eq!(button.text, "Buy it now");
    ctx.store.checkout(Some(&button)).await.unwrap();

    let events = ctx.events.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.key, ORDER_PLACED_EVENT);
    assert!(event.user.id.starts_with("uid_"));
    assert_eq!(event.tags["buttonText"], "Buy it now");
    assert_eq!(event.tags["variationKey"], "variation_b");
    assert_eq!(event.tags["flagEnabled"], Value::Bool(true));
    assert_eq!(event.tags["cartItemCount"], 3);
    assert_eq!(event.tags["cartTotal"], 3700);
}

#[tokio::test]
async fn test_tracking_failure_does_not_block_checkout() {
    let ctx = TestContext::with_failing_tracking(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "orderId": "o-9"})),
    )
    .await;

    let placed = ctx.store.checkout(Some(&button_from_flag())).await.unwrap();

    assert_eq!(placed.order_id, Some(OrderId::new("o-9")));
    assert_eq!(ctx.events.events().len(), 1);
    assert!(ctx.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_sends_nothing() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    ctx.mount_products(json!([])).await;
    ctx.mount_cart("a@b.com", json!([])).await;
    ctx.mount_orders("a@b.com", json!([])).await;
    ctx.store.refresh_all(None).await;

    assert_eq!(ctx.store.checkout(Some(&button_from_flag())).await, None);

    assert_eq!(ctx.requests("POST", "/orders").await, 0);
    assert!(ctx.events.events().is_empty());
    assert!(ctx.store.orders().is_empty());
}

#[tokio::test]
async fn test_checkout_logged_out_sends_nothing() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.store.checkout(None).await, None);

    assert_eq!(ctx.request_count().await, 0);
}

#[tokio::test]
async fn test_checkout_failure_alerts_and_keeps_state() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(400).set_body_json(json!({"error": "Cart is empty"})),
    )
    .await;

    assert_eq!(ctx.store.checkout(None).await, None);

    let alert = ctx.notifier.last().unwrap();
    assert_eq!(alert.title, messages::CHECKOUT_FAILED);
    assert_eq!(alert.message, "Cart is empty");
    assert_eq!(ctx.store.cart().len(), 2);
    assert_eq!(ctx.requests("GET", "/cart").await, 1);
}

#[tokio::test]
async fn test_explicit_rejection_is_a_failure() {
    let ctx = TestContext::with_stored_user(ALICE).await;
    with_cart(&ctx).await;
    mount_place_order(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": false, "orderId": "o-10"})),
    )
    .await;

    assert_eq!(ctx.store.checkout(None).await, None);
    assert_eq!(ctx.notifier.last().unwrap().title, messages::CHECKOUT_FAILED);
}
