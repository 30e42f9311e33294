//! WhatsApp checkout redirect.

use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use tracing::instrument;

use friends_store_core::ProductId;

use crate::error::{AppError, Result};
use crate::services::purchase_url;
use crate::state::AppState;

/// Build the checkout router.
pub fn router() -> Router<AppState> {
    Router::new().route("/products/{id}/purchase", get(purchase))
}

/// Open a WhatsApp chat pre-filled with the product and price.
///
/// GET /products/{id}/purchase
#[instrument(skip(state))]
async fn purchase(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Redirect> {
    let product = state
        .catalog()
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    tracing::info!(product = %product.name, "Purchase redirected to WhatsApp");
    Ok(Redirect::to(&purchase_url(state.whatsapp_number(), &product)))
}
