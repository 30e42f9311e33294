//! `PostgreSQL` product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use friends_store_core::{Amount, Product, ProductId};

use super::{ProductSource, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, category, rating, \
     reviews, in_stock, tags, features, images, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Amount,
    original_price: Option<Amount>,
    category: String,
    rating: f32,
    reviews: i32,
    in_stock: bool,
    tags: Vec<String>,
    features: Vec<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let reviews = u32::try_from(row.reviews).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative review count {} on product {}",
                row.reviews, row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            category: row.category,
            rating: row.rating,
            reviews,
            in_stock: row.in_stock,
            tags: row.tags,
            features: row.features,
            images: row.images,
            created_at: row.created_at,
        })
    }
}

/// Repository for catalog products.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductSource for ProductRepository {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
