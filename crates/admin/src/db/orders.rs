//! `PostgreSQL` order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use friends_store_core::{
    Amount, Email, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderNumber,
    OrderStatus,
};

use super::{OrderStore, RepositoryError};

/// How many fresh order numbers to try before giving up on a collision.
const ORDER_NUMBER_ATTEMPTS: usize = 3;

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
     delivery_address, notes, total, status, created_at";

const ITEM_COLUMNS: &str = "id, order_id, product_name, quantity, price, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    customer_email: Option<String>,
    customer_phone: String,
    delivery_address: String,
    notes: Option<String>,
    total: Amount,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse_optional(row.customer_email.as_deref()).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email on order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            order_number: OrderNumber::from_existing(row.order_number),
            customer_name: row.customer_name,
            customer_email,
            customer_phone: row.customer_phone,
            delivery_address: row.delivery_address,
            notes: row.notes,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_name: String,
    quantity: i32,
    price: Amount,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "invalid quantity {} on item {}",
                    row.quantity, row.id
                ))
            })?;

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_name: row.product_name,
            quantity,
            price: row.price,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed [`OrderStore`].
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl OrderStore for OrderRepository {
    #[instrument(skip(self, order), fields(customer = %order.customer_name))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (id, order_number, customer_name, customer_email, customer_phone, \
             delivery_address, notes, total, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        );

        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let order_number = OrderNumber::generate(Utc::now());
            let result = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(OrderId::random())
                .bind(order_number.as_str())
                .bind(&order.customer_name)
                .bind(order.customer_email.as_ref().map(Email::as_str))
                .bind(&order.customer_phone)
                .bind(&order.delivery_address)
                .bind(order.notes.as_deref())
                .bind(order.total)
                .bind(order.status)
                .fetch_one(&self.pool)
                .await;

            match result {
                Ok(row) => return row.try_into(),
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(attempt, %order_number, "Order number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique order number".to_string(),
        ))
    }

    #[instrument(skip(self, item), fields(order_id = %item.order_id))]
    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let quantity = i32::try_from(item.quantity).map_err(|_| {
            RepositoryError::Conflict(format!("quantity {} is out of range", item.quantity))
        })?;

        let row = sqlx::query_as::<_, OrderItemRow>(&format!(
            "INSERT INTO order_items (id, order_id, product_name, quantity, price) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(OrderItemId::random())
        .bind(item.order_id)
        .bind(&item.product_name)
        .bind(quantity)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
