//! `PostgreSQL` product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use friends_store_core::{Amount, Product, ProductDraft, ProductId};

use super::{ProductStore, RepositoryError};

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

/// `PostgreSQL`-backed [`ProductStore`].
#[derive(Debug, Clone)]
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
impl ProductStore for ProductRepository {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
                 (id, name, description, price, original_price, category, rating, \
                  in_stock, tags, features, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(ProductId::random())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(&draft.category)
        .bind(draft.rating)
        .bind(draft.in_stock)
        .bind(&draft.tags)
        .bind(&draft.features)
        .bind(&draft.images)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self, draft))]
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
                 name = $2, description = $3, price = $4, original_price = $5, \
                 category = $6, rating = $7, in_stock = $8, tags = $9, features = $10, \
                 images = $11 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(&draft.category)
        .bind(draft.rating)
        .bind(draft.in_stock)
        .bind(&draft.tags)
        .bind(&draft.features)
        .bind(&draft.images)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
