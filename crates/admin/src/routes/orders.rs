//! Orders management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, RawForm, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use friends_store_core::{
    Amount, DraftLine, Order, OrderDraft, OrderId, OrderItem, OrderStatus, StatusFilter,
};

use super::render;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::services::{ItemsState, NotifyOutcome, OrderBoard};
use crate::state::AppState;

/// Blank item rows offered by the create form.
const FORM_ITEM_ROWS: usize = 5;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index).post(create))
        .route("/orders/{id}/status", post(update_status))
        .route("/orders/{id}/delete", post(delete))
        .route("/orders/{id}/items", get(items))
}

// =============================================================================
// Views
// =============================================================================

/// Tailwind classes for a status badge.
const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Received => "bg-blue-100 text-blue-700",
        OrderStatus::Dispatched => "bg-yellow-100 text-yellow-700",
        OrderStatus::Completed => "bg-green-100 text-green-700",
        OrderStatus::Returned => "bg-purple-100 text-purple-700",
        OrderStatus::Cancelled => "bg-red-100 text-red-700",
    }
}

/// Order view for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub total: String,
    pub status: &'static str,
    pub created_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.as_ref().map(ToString::to_string),
            customer_phone: order.customer_phone.clone(),
            delivery_address: order.delivery_address.clone(),
            notes: order.notes.clone(),
            total: order.total.display_rupees(),
            status: order.status.as_str(),
            created_at: order.created_at.format("%d %b %Y, %H:%M").to_string(),
        }
    }
}

/// Status filter tab.
#[derive(Debug, Clone)]
pub struct StatusTab {
    pub value: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

/// A status group as displayed.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub label: &'static str,
    pub badge_class: &'static str,
    pub orders: Vec<OrderView>,
}

/// Option in a status `<select>`.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_name: String,
    pub filter: &'static str,
    pub tabs: Vec<StatusTab>,
    pub groups: Vec<GroupView>,
    pub statuses: Vec<StatusOption>,
    pub item_rows: Vec<usize>,
    /// Blocking alert shown over the page.
    pub alert: Option<String>,
}

impl OrdersIndexTemplate {
    fn new(admin: &CurrentAdmin, filter: StatusFilter, board: &OrderBoard) -> Self {
        let mut tabs = vec![StatusTab {
            value: "all",
            label: "All",
            count: board.total(),
            active: filter == StatusFilter::All,
        }];
        tabs.extend(OrderStatus::ALL.iter().map(|status| StatusTab {
            value: status.as_str(),
            label: status.label(),
            count: board.count(*status),
            active: filter == StatusFilter::Only(*status),
        }));

        let groups = board
            .visible(filter)
            .into_iter()
            .map(|group| GroupView {
                label: group.status.label(),
                badge_class: status_class(group.status),
                orders: group.orders.iter().map(OrderView::from).collect(),
            })
            .collect();

        Self {
            admin_name: admin.name.clone(),
            filter: filter.as_str(),
            tabs,
            groups,
            statuses: OrderStatus::ALL
                .iter()
                .map(|s| StatusOption {
                    value: s.as_str(),
                    label: s.label(),
                })
                .collect(),
            item_rows: (1..=FORM_ITEM_ROWS).collect(),
            alert: None,
        }
    }
}

/// Re-render the order list with a blocking alert describing `err`.
async fn alert_page(
    state: &AppState,
    admin: &CurrentAdmin,
    filter: StatusFilter,
    err: AppError,
) -> Response {
    err.report();
    let board = match state.workflow().board().await {
        Ok(board) => board,
        Err(e) => return AppError::from(e).into_response(),
    };
    let mut page = OrdersIndexTemplate::new(admin, filter, &board);
    page.alert = Some(err.operator_message());
    (err.status(), render(&page)).into_response()
}

fn redirect_to_list(filter: StatusFilter) -> Redirect {
    Redirect::to(&format!("/orders?status={}", filter.as_str()))
}

fn log_outcome(outcome: &NotifyOutcome) {
    match outcome {
        NotifyOutcome::Sent => tracing::info!("Customer notified"),
        NotifyOutcome::Skipped(reason) => tracing::info!(?reason, "Customer not notified"),
        NotifyOutcome::Failed(error) => tracing::warn!(%error, "Customer notification failed"),
    }
}

// =============================================================================
// Forms
// =============================================================================

/// List query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_filter(raw: Option<&str>) -> Result<StatusFilter, AppError> {
    raw.unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub filter: Option<String>,
}

/// Delete form.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub filter: Option<String>,
}

/// Manual order form.
///
/// Item rows arrive as repeated `item_name` / `item_quantity` / `item_price`
/// fields, which `Form` cannot collect, so the body is parsed by hand.
#[derive(Debug, Default)]
struct CreateOrderForm {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    delivery_address: String,
    notes: String,
    item_names: Vec<String>,
    item_quantities: Vec<String>,
    item_prices: Vec<String>,
}

impl CreateOrderForm {
    fn parse(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let value = value.into_owned();
            match key.as_ref() {
                "customer_name" => form.customer_name = value,
                "customer_email" => form.customer_email = value,
                "customer_phone" => form.customer_phone = value,
                "delivery_address" => form.delivery_address = value,
                "notes" => form.notes = value,
                "item_name" => form.item_names.push(value),
                "item_quantity" => form.item_quantities.push(value),
                "item_price" => form.item_prices.push(value),
                _ => {}
            }
        }
        form
    }

    /// Convert to a draft, skipping rows left completely blank.
    fn into_draft(self) -> Result<OrderDraft, AppError> {
        let rows = self
            .item_names
            .len()
            .max(self.item_quantities.len())
            .max(self.item_prices.len());
        let field = |values: &[String], idx: usize| -> String {
            values.get(idx).map(|v| v.trim().to_string()).unwrap_or_default()
        };

        let mut items = Vec::new();
        for idx in 0..rows {
            let row = idx + 1;
            let name = field(&self.item_names, idx);
            let quantity = field(&self.item_quantities, idx);
            let price = field(&self.item_prices, idx);
            if name.is_empty() && quantity.is_empty() && price.is_empty() {
                continue;
            }

            let quantity = quantity.parse::<u32>().map_err(|_| {
                AppError::BadRequest(format!("row {row}: quantity must be a whole number"))
            })?;
            let price = price
                .parse::<Decimal>()
                .map_err(|_| AppError::BadRequest(format!("row {row}: price must be a number")))
                .and_then(|d| {
                    Amount::new(d).map_err(|e| AppError::BadRequest(format!("row {row}: {e}")))
                })?;

            items.push(DraftLine {
                product_name: name,
                quantity,
                price,
            });
        }

        Ok(OrderDraft {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            notes: self.notes,
            items,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Orders list page handler.
///
/// GET /orders?status=all|<status>
#[instrument(skip(admin, state), fields(admin = %admin.name))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Html<String>, AppError> {
    let filter = parse_filter(query.status.as_deref())?;
    let board = state.workflow().board().await?;
    Ok(render(&OrdersIndexTemplate::new(&admin, filter, &board)))
}

/// Create a manual order.
///
/// POST /orders
#[instrument(skip(admin, state, body), fields(admin = %admin.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Response {
    let draft = match CreateOrderForm::parse(&body).into_draft() {
        Ok(draft) => draft,
        Err(err) => return alert_page(&state, &admin, StatusFilter::All, err).await,
    };

    match state.workflow().create_order(draft).await {
        Ok((order, outcome)) => {
            tracing::info!(order_number = %order.order_number, "Manual order created");
            log_outcome(&outcome);
            redirect_to_list(StatusFilter::All).into_response()
        }
        Err(err) => alert_page(&state, &admin, StatusFilter::All, err.into()).await,
    }
}

/// Change an order's status.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state, form), fields(admin = %admin.name))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Response {
    let filter = parse_filter(form.filter.as_deref()).unwrap_or_default();
    let status = match form.status.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(e) => return alert_page(&state, &admin, filter, AppError::BadRequest(e)).await,
    };

    match state.workflow().update_status(id, status).await {
        Ok((_, outcome)) => {
            log_outcome(&outcome);
            redirect_to_list(filter).into_response()
        }
        Err(err) => alert_page(&state, &admin, filter, err.into()).await,
    }
}

/// Delete an order and its items.
///
/// POST /orders/{id}/delete
#[instrument(skip(admin, state, form), fields(admin = %admin.name))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let filter = parse_filter(form.filter.as_deref()).unwrap_or_default();
    match state.workflow().delete_order(id).await {
        Ok(()) => redirect_to_list(filter).into_response(),
        Err(err) => alert_page(&state, &admin, filter, err.into()).await,
    }
}

/// Line item view for templates.
#[derive(Debug, Clone)]
pub struct LineItemView {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for LineItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.price.display_rupees(),
            line_total: format!("₹{}", item.line_total().normalize()),
        }
    }
}

/// Order items partial template.
#[derive(Template)]
#[template(path = "orders/items.html")]
pub struct OrderItemsTemplate {
    pub items: Vec<LineItemView>,
    pub error: Option<String>,
}

/// Order line items, loaded when the details panel opens.
///
/// GET /orders/{id}/items
#[instrument(skip(_admin, state))]
pub async fn items(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Html<String> {
    let template = match state.workflow().order_items(id).await {
        ItemsState::Loaded(items) => OrderItemsTemplate {
            items: items.iter().map(LineItemView::from).collect(),
            error: None,
        },
        ItemsState::Empty => OrderItemsTemplate {
            items: vec![],
            error: None,
        },
        ItemsState::Failed(_) => OrderItemsTemplate {
            items: vec![],
            error: Some("Could not load items for this order.".to_string()),
        },
    };
    render(&template)
}
