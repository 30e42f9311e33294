//! Catalog JSON API.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use friends_store_core::{CATEGORIES, CatalogQuery, Product, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the catalog API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(show_product))
        .route("/api/categories", get(categories))
}

/// Product as served by the API, with display helpers precomputed.
#[derive(Debug, Serialize)]
struct ProductView {
    #[serde(flatten)]
    product: Product,
    cover_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_percent: Option<u32>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            cover_image: product.cover_image().to_string(),
            discount_percent: product.discount_percent(),
            product,
        }
    }
}

/// Filtered, sorted product list.
///
/// GET /api/products?category=&q=&sort=
#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.catalog().search(&query).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// One product.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    state
        .catalog()
        .product(id)
        .await?
        .map(|p| Json(ProductView::from(p)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Category names, `All` first.
///
/// GET /api/categories
async fn categories() -> Json<[&'static str; 5]> {
    Json(CATEGORIES)
}
