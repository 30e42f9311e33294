//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET /health                     - Liveness check
//! GET /health/ready               - Readiness check (catalog reachable)
//!
//! # Catalog API
//! GET /api/products?category=&q=&sort=
//! GET /api/products/{id}
//! GET /api/categories
//!
//! # Checkout
//! GET /products/{id}/purchase     - Redirect to a WhatsApp chat
//! ```

pub mod api;
pub mod checkout;

use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the complete storefront router.
pub fn routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api::router().layer(cors))
        .merge(checkout::router())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the product source is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().source().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use chrono::{Duration, Utc};
    use friends_store_core::{Amount, Product, ProductId};
    use tower::ServiceExt;

    use super::*;
    use crate::db::StaticCatalog;
    use crate::services::Catalog;

    fn product(name: &str, category: &str, price: u32, age_days: i64) -> Product {
        Product {
            id: ProductId::random(),
            name: name.to_string(),
            description: format!("Artificial {name}"),
            price: Amount::from_rupees(price),
            original_price: None,
            category: category.to_string(),
            rating: 4.5,
            reviews: 10,
            in_stock: true,
            tags: vec![],
            features: vec![],
            images: vec![],
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn app(products: Vec<Product>) -> Router {
        let catalog = Catalog::new(Arc::new(StaticCatalog::new(products)));
        routes().with_state(AppState::new(catalog, "917383800245".to_string()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let products = vec![
            product("Monstera", "Large Plants", 2500, 0),
            product("Ivy", "Hanging Plants", 600, 1),
            product("Fiddle Leaf Fig", "Large Plants", 3200, 2),
        ];
        let (status, body) = get_json(
            app(products),
            "/api/products?category=Large%20Plants&sort=price-high",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Fiddle Leaf Fig", "Monstera"]);
        assert_eq!(body[0]["price"].as_f64().unwrap(), 3200.0);
        assert_eq!(body[0]["cover_image"], "/placeholder.svg");
        assert!(body[0].get("discount_percent").is_none());
    }

    #[tokio::test]
    async fn test_search_query() {
        let products = vec![
            product("Monstera", "Large Plants", 2500, 0),
            product("Ivy", "Hanging Plants", 600, 1),
        ];
        let (_, body) = get_json(app(products), "/api/products?q=IVY").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_show_product_includes_discount() {
        let mut fig = product("Fiddle Leaf Fig", "Large Plants", 1500, 0);
        fig.original_price = Some(Amount::from_rupees(2000));
        let id = fig.id;

        let (status, body) = get_json(app(vec![fig]), &format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Fiddle Leaf Fig");
        assert_eq!(body["discount_percent"], 25);
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let (status, body) = get_json(
            app(vec![]),
            &format!("/api/products/{}", ProductId::random()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().starts_with("Not found"));
    }

    #[tokio::test]
    async fn test_categories() {
        let (_, body) = get_json(app(vec![]), "/api/categories").await;
        assert_eq!(body[0], "All");
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_purchase_redirects_to_whatsapp() {
        let fern = product("Boston Fern", "Hanging Plants", 900, 0);
        let id = fern.id;
        let response = app(vec![fern])
            .oneshot(
                Request::get(format!("/products/{id}/purchase"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(location.starts_with("https://wa.me/917383800245?text="));
        assert!(location.contains("Boston%20Fern"));
        assert!(location.contains("%E2%82%B9900"));
    }

    #[tokio::test]
    async fn test_purchase_unknown_product() {
        let response = app(vec![])
            .oneshot(
                Request::get(format!("/products/{}/purchase", ProductId::random()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
