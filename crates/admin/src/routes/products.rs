//! Catalog management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use friends_store_core::{Amount, CATEGORIES, Product, ProductDraft, ProductId};

use super::render;
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_form))
        .route("/products/{id}/edit", get(edit_form).post(update))
        .route("/products/{id}/delete", post(delete))
}

// =============================================================================
// Views
// =============================================================================

/// Product row for the catalog table.
#[derive(Debug, Clone)]
pub struct ProductListView {
    pub id: String,
    pub name: String,
    pub cover_image: String,
    pub category: String,
    pub rating: String,
    pub reviews: u32,
    pub price: String,
    pub original_price: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductListView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            cover_image: product.cover_image().to_string(),
            category: product.category.clone(),
            rating: format!("{:.1}", product.rating),
            reviews: product.reviews,
            price: product.price.display_rupees(),
            original_price: product.original_price.map(|p| p.display_rupees()),
            in_stock: product.in_stock,
        }
    }
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_name: String,
    pub query: String,
    pub products: Vec<ProductListView>,
    pub total: usize,
}

impl ProductsIndexTemplate {
    fn new(admin: &CurrentAdmin, query: &str, products: &[Product]) -> Self {
        let needle = query.trim().to_lowercase();
        Self {
            admin_name: admin.name.clone(),
            query: query.trim().to_string(),
            products: products
                .iter()
                .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
                .map(ProductListView::from)
                .collect(),
            total: products.len(),
        }
    }
}

/// Category choice in the form's select.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_name: String,
    pub heading: String,
    pub action: String,
    pub form: ProductForm,
    /// Selectable categories, without the `All` filter.
    pub categories: Vec<CategoryOption>,
    pub alert: Option<String>,
}

impl ProductFormTemplate {
    fn new(admin: &CurrentAdmin, editing: Option<ProductId>, form: ProductForm) -> Self {
        let (heading, action) = match editing {
            Some(id) => ("Edit Product".to_string(), format!("/products/{id}/edit")),
            None => ("Add Product".to_string(), "/products".to_string()),
        };
        let categories = CATEGORIES[1..]
            .iter()
            .map(|&name| CategoryOption {
                name,
                selected: name == form.category,
            })
            .collect();
        Self {
            admin_name: admin.name.clone(),
            heading,
            action,
            form,
            categories,
            alert: None,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Product form as submitted. Every field arrives as text so a rejected
/// form can be shown again exactly as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: String,
    pub category: String,
    pub rating: String,
    /// Checkbox: present when ticked.
    pub in_stock: Option<String>,
    /// Comma separated.
    pub tags: String,
    /// One per line.
    pub features: String,
    /// One URL per line, cover first.
    pub images: String,
}

impl ProductForm {
    /// Blank form for a new product.
    fn blank() -> Self {
        Self {
            category: CATEGORIES[1].to_string(),
            rating: "0".to_string(),
            in_stock: Some("on".to_string()),
            ..Self::default()
        }
    }

    fn into_draft(self) -> Result<ProductDraft, AppError> {
        let price = parse_amount("price", &self.price)?
            .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
        let original_price = parse_amount("original price", &self.original_price)?;
        let rating = match self.rating.trim() {
            "" => 0.0,
            r => r
                .parse::<f32>()
                .map_err(|_| AppError::BadRequest("rating must be a number".to_string()))?,
        };

        let draft = ProductDraft {
            name: self.name,
            description: self.description,
            price,
            original_price,
            category: self.category,
            rating,
            in_stock: self.in_stock.is_some(),
            tags: self.tags.split(',').map(str::to_string).collect(),
            features: self.features.lines().map(str::to_string).collect(),
            images: self.images.lines().map(str::to_string).collect(),
        };
        Ok(draft.validate()?)
    }

    /// Whether the in-stock box should render ticked.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.in_stock.is_some()
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            original_price: product
                .original_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            category: product.category.clone(),
            rating: product.rating.to_string(),
            in_stock: product.in_stock.then(|| "on".to_string()),
            tags: product.tags.join(", "),
            features: product.features.join("\n"),
            images: product.images.join("\n"),
        }
    }
}

/// Blank input is `None`.
fn parse_amount(field: &str, raw: &str) -> Result<Option<Amount>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = raw
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest(format!("{field} must be a number")))?;
    Amount::new(value)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("{field}: {e}")))
}

fn not_found(id: ProductId) -> impl FnOnce(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
        e => e.into(),
    }
}

/// Show the submitted form again with the error as an alert.
fn form_alert(
    admin: &CurrentAdmin,
    editing: Option<ProductId>,
    form: ProductForm,
    err: &AppError,
) -> Response {
    err.report();
    let mut page = ProductFormTemplate::new(admin, editing, form);
    page.alert = Some(err.operator_message());
    (err.status(), render(&page)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Catalog table.
///
/// GET /products?q=
#[instrument(skip(state, admin))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    let products = state.products().list_products().await?;
    Ok(render(&ProductsIndexTemplate::new(&admin, &search.q, &products)))
}

/// GET /products/new
async fn new_form(RequireAdminAuth(admin): RequireAdminAuth) -> Html<String> {
    render(&ProductFormTemplate::new(&admin, None, ProductForm::blank()))
}

/// POST /products
#[instrument(skip(state, admin, form), fields(admin = %admin.name))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Response {
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(e) => return form_alert(&admin, None, form, &e),
    };
    match state.products().create_product(draft).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, name = %product.name, "Product created");
            Redirect::to("/products").into_response()
        }
        Err(e) => form_alert(&admin, None, form, &e.into()),
    }
}

/// GET /products/{id}/edit
#[instrument(skip(state, admin))]
async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = state
        .products()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(render(&ProductFormTemplate::new(
        &admin,
        Some(id),
        ProductForm::from(&product),
    )))
}

/// POST /products/{id}/edit
#[instrument(skip(state, admin, form), fields(admin = %admin.name))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(e) => return form_alert(&admin, Some(id), form, &e),
    };
    match state.products().update_product(id, draft).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product updated");
            Redirect::to("/products").into_response()
        }
        Err(RepositoryError::NotFound) => {
            AppError::NotFound(format!("product {id}")).into_response()
        }
        Err(e) => form_alert(&admin, Some(id), form, &e.into()),
    }
}

/// POST /products/{id}/delete
#[instrument(skip(state, admin), fields(admin = %admin.name))]
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    state
        .products()
        .delete_product(id)
        .await
        .map_err(not_found(id))?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Redirect::to("/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use reqwest::Client;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::db::{MemoryOrderStore, MemoryProductStore, ProductStore};
    use crate::middleware::create_session_layer;
    use crate::services::{OrderNotifier, OrderWorkflow};

    const TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    const FERN: &str = "name=Boston+Fern&description=Lush&price=1499&original_price=1999\
                        &category=Hanging+Plants&rating=4.5&in_stock=on\
                        &tags=fern%2C+green%2C+fern&features=UV+safe%0AWashable\
                        &images=https%3A%2F%2Fcdn.example%2Ffern.jpg";

    fn app() -> (Router, Arc<MemoryProductStore>) {
        let orders = Arc::new(MemoryOrderStore::new());
        let notifier = OrderNotifier::new(orders.clone(), Client::new(), None);
        let products = Arc::new(MemoryProductStore::new());
        let state = AppState::new(
            SecretString::from(TOKEN),
            OrderWorkflow::new(orders, notifier),
            products.clone(),
        );
        let router = crate::routes::routes()
            .layer(create_session_layer(MemoryStore::default(), "http://localhost"))
            .with_state(state);
        (router, products)
    }

    async fn sign_in(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(form_post(
                "/auth/login",
                "",
                &format!(
                    "name=Priya&token={}",
                    url::form_urlencoded::byte_serialize(TOKEN.as_bytes()).collect::<String>()
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        cookie.to_str().unwrap().split(';').next().unwrap().to_string()
    }

    fn form_post(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn fern_form() -> ProductForm {
        ProductForm {
            name: " Boston Fern ".to_string(),
            description: "Lush".to_string(),
            price: "1499".to_string(),
            original_price: "1999".to_string(),
            category: "Hanging Plants".to_string(),
            rating: "4.5".to_string(),
            in_stock: Some("on".to_string()),
            tags: "fern, green, fern".to_string(),
            features: "UV safe\r\n\nWashable".to_string(),
            images: "https://cdn.example/fern.jpg\n".to_string(),
        }
    }

    #[test]
    fn test_form_into_draft_splits_lists() {
        let draft = fern_form().into_draft().unwrap();
        assert_eq!(draft.name, "Boston Fern");
        assert_eq!(draft.price, Amount::from_rupees(1499));
        assert_eq!(draft.original_price, Some(Amount::from_rupees(1999)));
        assert_eq!(draft.tags, vec!["fern", "green"]);
        assert_eq!(draft.features, vec!["UV safe", "Washable"]);
        assert_eq!(draft.images, vec!["https://cdn.example/fern.jpg"]);
        assert!(draft.in_stock);
    }

    #[test]
    fn test_form_rejects_bad_prices() {
        let mut form = fern_form();
        form.price = String::new();
        assert!(matches!(form.clone().into_draft(), Err(AppError::BadRequest(m)) if m.contains("required")));

        form.price = "12.345".to_string();
        assert!(matches!(form.clone().into_draft(), Err(AppError::BadRequest(m)) if m.contains("two decimal places")));

        form.price = "100".to_string();
        form.original_price = "lots".to_string();
        assert!(matches!(form.into_draft(), Err(AppError::BadRequest(m)) if m.contains("original price")));
    }

    #[tokio::test]
    async fn test_products_require_sign_in() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/products").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth/login");
    }

    #[tokio::test]
    async fn test_create_then_list_and_search() {
        let (app, store) = app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(form_post("/products", &cookie, FERN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/products");

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].reviews, 0);
        assert_eq!(products[0].tags, vec!["fern", "green"]);

        let html = body_text(app.clone().oneshot(get("/products", &cookie)).await.unwrap()).await;
        assert!(html.contains("Boston Fern"));
        assert!(html.contains("₹1499"));
        assert!(html.contains("₹1999"));
        assert!(html.contains("fern.jpg"));

        let html = body_text(app.clone().oneshot(get("/products?q=FERN", &cookie)).await.unwrap()).await;
        assert!(html.contains("Boston Fern"));
        let html = body_text(app.oneshot(get("/products?q=monstera", &cookie)).await.unwrap()).await;
        assert!(!html.contains("Boston Fern"));
    }

    #[tokio::test]
    async fn test_new_form_offers_real_categories() {
        let (app, _) = app();
        let cookie = sign_in(&app).await;

        let response = app.oneshot(get("/products/new", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Hanging Plants"));
        assert!(!html.contains(r#"value="All""#));
    }

    #[tokio::test]
    async fn test_invalid_product_shows_alert() {
        let (app, store) = app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(form_post(
                "/products",
                &cookie,
                "name=Fern&price=100&category=All&rating=4",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("unknown category"));
        assert!(html.contains(r#"value="Fern""#));

        let response = app
            .oneshot(form_post("/products", &cookie, "name=Fern&price=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("price must be a number"));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_reviews() {
        let (app, store) = app();
        let cookie = sign_in(&app).await;
        app.clone()
            .oneshot(form_post("/products", &cookie, FERN))
            .await
            .unwrap();
        let fern = store.list_products().await.unwrap().remove(0);

        let html = body_text(
            app.clone()
                .oneshot(get(&format!("/products/{}/edit", fern.id), &cookie))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("Edit Product"));
        assert!(html.contains("Boston Fern"));

        let response = app
            .clone()
            .oneshot(form_post(
                &format!("/products/{}/edit", fern.id),
                &cookie,
                "name=Boston+Fern+XL&price=1799&category=Large+Plants&rating=4.8",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let updated = store.get_product(fern.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Boston Fern XL");
        assert_eq!(updated.price, Amount::from_rupees(1799));
        assert_eq!(updated.original_price, None);
        assert_eq!(updated.category, "Large Plants");
        assert!(!updated.in_stock);
        assert_eq!(updated.reviews, fern.reviews);
        assert_eq!(updated.created_at, fern.created_at);

        let missing = ProductId::random();
        let response = app
            .clone()
            .oneshot(get(&format!("/products/{missing}/edit"), &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = app
            .oneshot(form_post(
                &format!("/products/{missing}/edit"),
                &cookie,
                "name=Ghost&price=1&category=Small+Plants",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let (app, store) = app();
        let cookie = sign_in(&app).await;
        app.clone()
            .oneshot(form_post("/products", &cookie, FERN))
            .await
            .unwrap();
        let id = store.list_products().await.unwrap()[0].id;

        let response = app
            .clone()
            .oneshot(form_post(&format!("/products/{id}/delete"), &cookie, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(store.list_products().await.unwrap().is_empty());

        let response = app
            .oneshot(form_post(&format!("/products/{id}/delete"), &cookie, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
