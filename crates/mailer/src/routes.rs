//! HTTP routes for the email functions.
//!
//! ```text
//! POST /send-order-email    - Order status notification to the customer
//! POST /send-contact-email  - Contact form message to the store inbox
//! GET  /health              - Liveness check
//! ```
//!
//! Both functions answer `200 {"success": true}` or `500 {"error": ...}` and
//! accept cross-origin calls from any origin.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use friends_store_core::{ContactMessage, OrderEmailPayload};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::error::EmailError;
use crate::services::EmailSender;

/// Permissive CORS for browser callers.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Build the mailer router.
pub fn router(sender: EmailSender) -> Router {
    Router::new()
        .route("/send-order-email", post(send_order_email))
        .route("/send-contact-email", post(send_contact_email))
        .route("/health", get(health))
        .layer(cors_layer())
        .with_state(sender)
}

/// POST /send-order-email
async fn send_order_email(
    State(sender): State<EmailSender>,
    payload: Result<Json<OrderEmailPayload>, JsonRejection>,
) -> Result<Json<Value>, EmailError> {
    let Json(payload) = payload.map_err(|e| EmailError::InvalidPayload(e.body_text()))?;
    sender.send_order_email(&payload).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /send-contact-email
async fn send_contact_email(
    State(sender): State<EmailSender>,
    message: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<Json<Value>, EmailError> {
    let Json(message) = message.map_err(|e| EmailError::InvalidPayload(e.body_text()))?;
    sender.send_contact_email(&message).await?;
    Ok(Json(json!({ "success": true })))
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::tests::full_env;
    use crate::services::OutboxTransport;

    fn app(env: HashMap<String, String>) -> (Router, OutboxTransport) {
        let outbox = OutboxTransport::new();
        let sender = EmailSender::new(Arc::new(env), Arc::new(outbox.clone()));
        (router(sender), outbox)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("origin", "https://friendsstore.in")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const ORDER: &str = r#"{
        "customerEmail": "asha@plants.in",
        "customerName": "Asha",
        "orderNumber": "FS-20260307-K7Q2M",
        "status": "dispatched",
        "items": [{"product_name": "Monstera", "quantity": 2, "price": 100}],
        "total": 200
    }"#;

    #[tokio::test]
    async fn test_send_order_email_success() {
        let (app, outbox) = app(full_env());
        let response = app.oneshot(post_json("/send-order-email", ORDER)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(json_body(response).await, json!({ "success": true }));
        assert_eq!(outbox.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_smtp_config_is_500() {
        let mut env = full_env();
        env.remove("SMTP_HOST");
        let (app, outbox) = app(env);
        let response = app.oneshot(post_json("/send-order-email", ORDER)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("SMTP_HOST"));
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_500() {
        let (app, outbox) = app(full_env());
        let response = app
            .oneshot(post_json("/send-order-email", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"].is_string());
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn test_contact_email() {
        let (app, outbox) = app(full_env());
        let response = app
            .oneshot(post_json(
                "/send-contact-email",
                r#"{"name":"Ravi","email":"ravi@example.in","subject":"Hi","message":"Hello"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(outbox.sent()[0].content.subject, "New contact message: Hi");
    }

    #[tokio::test]
    async fn test_preflight_allows_client_headers() {
        let (app, _) = app(full_env());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/send-order-email")
            .header("origin", "https://friendsstore.in")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "apikey, content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let allowed = response
            .headers()
            .get("access-control-allow-headers")
            .unwrap()
            .to_str()
            .unwrap()
            .to_lowercase();
        assert!(allowed.contains("apikey"));
        assert!(allowed.contains("x-client-info"));
    }
}
