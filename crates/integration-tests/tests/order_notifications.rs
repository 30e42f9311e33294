//! Order workflow → notifier → mailer pipeline.
//!
//! Each test starts its own mailer on a loopback port; emails land in the
//! mailer's recording transport instead of an SMTP server.

#![allow(clippy::unwrap_used)]

use friends_store_admin::db::OrderStore;
use friends_store_admin::services::{NotifyOutcome, SkipReason};
use friends_store_core::{Amount, DraftLine, OrderDraft, OrderId, OrderStatus};
use friends_store_integration_tests::{TestContext, smtp_env};

fn line(name: &str, quantity: u32, rupees: u32) -> DraftLine {
    DraftLine {
        product_name: name.to_string(),
        quantity,
        price: Amount::from_rupees(rupees),
    }
}

fn draft(email: &str) -> OrderDraft {
    OrderDraft {
        customer_name: "Asha Patel".to_string(),
        customer_email: email.to_string(),
        customer_phone: "+91 98765 43210".to_string(),
        delivery_address: "12 MG Road, Pune".to_string(),
        notes: "Leave with the guard".to_string(),
        items: vec![line("Monstera", 2, 100), line("Boston Fern", 1, 50)],
    }
}

#[tokio::test]
async fn test_new_order_sends_confirmation_with_items_and_total() {
    let ctx = TestContext::new().await;

    let (order, outcome) = ctx.workflow.create_order(draft("asha@plants.in")).await.unwrap();
    assert_eq!(outcome, NotifyOutcome::Sent);
    assert_eq!(order.total, Amount::from_rupees(250));

    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, "asha@plants.in");
    assert_eq!(email.from, "orders@friendsstore.in");
    assert_eq!(email.content.subject, "Order Confirmed - Friends Store");
    assert!(email.content.text.contains(order.order_number.as_str()));
    assert!(email.content.text.contains("Monstera x 2 @ ₹100"));
    assert!(email.content.text.contains("Total: ₹250"));
    assert_eq!(email.content.html.matches("class=\"item-row\"").count(), 2);
}

#[tokio::test]
async fn test_each_status_change_sends_one_email() {
    let ctx = TestContext::new().await;
    let (order, _) = ctx.workflow.create_order(draft("asha@plants.in")).await.unwrap();

    ctx.workflow
        .update_status(order.id, OrderStatus::Dispatched)
        .await
        .unwrap();
    ctx.workflow
        .update_status(order.id, OrderStatus::Received)
        .await
        .unwrap();

    let subjects: Vec<String> = ctx
        .sent()
        .into_iter()
        .map(|email| email.content.subject)
        .collect();
    assert_eq!(
        subjects,
        [
            "Order Confirmed - Friends Store",
            "Order Shipped - Friends Store",
            "Order Confirmed - Friends Store",
        ]
    );
}

#[tokio::test]
async fn test_missing_order_makes_no_request() {
    let ctx = TestContext::new().await;
    let (order, _) = ctx.workflow.create_order(draft("asha@plants.in")).await.unwrap();
    ctx.workflow.delete_order(order.id).await.unwrap();

    let outcome = ctx.notifier.notify(order.id, OrderStatus::Dispatched).await;
    assert_eq!(outcome, NotifyOutcome::Skipped(SkipReason::OrderNotFound));

    let outcome = ctx.notifier.notify(OrderId::random(), OrderStatus::Completed).await;
    assert_eq!(outcome, NotifyOutcome::Skipped(SkipReason::OrderNotFound));

    // Only the confirmation for the order before it was deleted.
    assert_eq!(ctx.sent().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_items_too() {
    let ctx = TestContext::new().await;
    let (order, _) = ctx.workflow.create_order(draft("asha@plants.in")).await.unwrap();
    assert_eq!(ctx.store.list_items(order.id).await.unwrap().len(), 2);

    ctx.workflow.delete_order(order.id).await.unwrap();

    assert!(ctx.store.get_order(order.id).await.unwrap().is_none());
    assert!(ctx.store.list_items(order.id).await.unwrap().is_empty());
    assert_eq!(ctx.workflow.board().await.unwrap().total(), 0);
}

#[tokio::test]
async fn test_order_without_email_is_not_notified() {
    let ctx = TestContext::new().await;

    let (_, outcome) = ctx.workflow.create_order(draft("")).await.unwrap();

    assert_eq!(outcome, NotifyOutcome::Skipped(SkipReason::NoCustomerEmail));
    assert!(ctx.sent().is_empty());
}

#[tokio::test]
async fn test_missing_smtp_config_fails_notification_not_the_change() {
    let mut env = smtp_env();
    env.remove("SMTP_HOST");
    let ctx = TestContext::with_smtp_env(env).await;

    let (order, outcome) = ctx.workflow.create_order(draft("asha@plants.in")).await.unwrap();
    assert!(matches!(&outcome, NotifyOutcome::Failed(msg) if msg.contains("500")));

    let (updated, outcome) = ctx
        .workflow
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert!(!outcome.is_sent());

    assert!(ctx.sent().is_empty());
    assert_eq!(
        ctx.store.get_order(order.id).await.unwrap().unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test]
async fn test_mailer_rejects_bad_payload_over_http() {
    let ctx = TestContext::new().await;

    let response = reqwest::Client::new()
        .post(ctx.mailer_url.join("/send-order-email").unwrap())
        .header("content-type", "application/json")
        .body("{\"customer_email\": 42}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(ctx.sent().is_empty());
}
