//! Admin panel over real HTTP: sign in, create an order from the form,
//! change its status, and check what the customer was sent.

#![allow(clippy::unwrap_used)]

use friends_store_admin::db::OrderStore;
use friends_store_core::{Amount, OrderStatus};
use friends_store_integration_tests::{ADMIN_TOKEN, TestContext, spawn};
use reqwest::{Client, StatusCode, redirect::Policy};

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

async fn signed_in(base: &str) -> Client {
    let client = client();
    let response = client
        .post(format!("{base}/auth/login"))
        .form(&[("name", "Priya"), ("token", ADMIN_TOKEN)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    client
}

#[tokio::test]
async fn test_orders_page_requires_sign_in() {
    let ctx = TestContext::new().await;
    let base = format!("http://{}", spawn(ctx.admin_router()).await);

    let response = client().get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/auth/login");

    let response = client()
        .post(format!("{base}/auth/login"))
        .form(&[("name", "Priya"), ("token", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_manual_order_round_trip() {
    let ctx = TestContext::new().await;
    let base = format!("http://{}", spawn(ctx.admin_router()).await);
    let client = signed_in(&base).await;

    let response = client
        .post(format!("{base}/orders"))
        .form(&[
            ("customer_name", "Asha Patel"),
            ("customer_email", "asha@plants.in"),
            ("customer_phone", "+91 98765 43210"),
            ("delivery_address", "12 MG Road, Pune"),
            ("notes", ""),
            ("item_name", "Monstera"),
            ("item_quantity", "2"),
            ("item_price", "100"),
            ("item_name", ""),
            ("item_quantity", ""),
            ("item_price", ""),
            ("item_name", "Boston Fern"),
            ("item_quantity", "1"),
            ("item_price", "50"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let orders = ctx.store.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.total, Amount::from_rupees(250));
    assert_eq!(order.status, OrderStatus::Received);

    let page = client
        .get(format!("{base}/orders?status=received"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(order.order_number.as_str()));
    assert!(page.contains("Asha Patel"));

    let response = client
        .post(format!("{base}/orders/{}/status", order.id))
        .form(&[("status", "dispatched"), ("filter", "received")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/orders?status=received");

    let subjects: Vec<String> = ctx
        .sent()
        .into_iter()
        .map(|email| email.content.subject)
        .collect();
    assert_eq!(
        subjects,
        ["Order Confirmed - Friends Store", "Order Shipped - Friends Store"]
    );
}

#[tokio::test]
async fn test_invalid_status_is_rejected_with_alert() {
    let ctx = TestContext::new().await;
    let base = format!("http://{}", spawn(ctx.admin_router()).await);
    let client = signed_in(&base).await;

    let response = client
        .post(format!("{base}/orders/{}/status", friends_store_core::OrderId::random()))
        .form(&[("status", "shipped")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("invalid order status"));
    assert!(ctx.sent().is_empty());
}
