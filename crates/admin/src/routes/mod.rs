//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (order store reachable)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Sign in with the access token
//! POST /auth/logout            - Sign out
//!
//! # Orders
//! GET  /orders?status=         - Orders grouped by status, with counts
//! POST /orders                 - Create a manual order
//! POST /orders/{id}/status     - Change status (notifies the customer)
//! POST /orders/{id}/delete     - Delete order and items
//! GET  /orders/{id}/items      - Line items partial
//!
//! # Products
//! GET  /products?q=            - Catalog list, filtered by name
//! GET  /products/new           - New product form
//! POST /products               - Create product
//! GET  /products/{id}/edit     - Edit form
//! POST /products/{id}/edit     - Save changes
//! POST /products/{id}/delete   - Delete product
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
};

use crate::state::AppState;

/// Build the complete admin router (without session or tracing layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(orders::router())
        .merge(products::router())
}

/// Render a page, logging template failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the order store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.workflow().store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
