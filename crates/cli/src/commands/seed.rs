//! Seed the catalog with products from a YAML file.
//!
//! ```yaml
//! - name: Monstera Deliciosa
//!   description: Lifelike split leaves in a ceramic pot
//!   price: 2499
//!   original_price: 2999
//!   category: Large Plants
//!   rating: 4.8
//!   reviews: 124
//!   tags: [tropical, living room]
//!   features: [UV resistant, No watering]
//!   images: [https://cdn.friendsstore.in/monstera.jpg]
//! ```

use std::path::Path;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use friends_store_core::{Amount, ProductDraft, ProductId};

/// One product entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Amount,
    #[serde(default)]
    pub original_price: Option<Amount>,
    pub category: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

const fn default_in_stock() -> bool {
    true
}

impl ProductSeed {
    fn draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            original_price: self.original_price,
            category: self.category.clone(),
            rating: self.rating,
            in_stock: self.in_stock,
            tags: self.tags.clone(),
            features: self.features.clone(),
            images: self.images.clone(),
        }
    }
}

/// A seed entry that passed validation.
struct ValidSeed {
    draft: ProductDraft,
    reviews: i32,
}

/// Check every entry, returning the cleaned entries or one message per
/// invalid entry.
fn validate(seeds: &[ProductSeed]) -> Result<Vec<ValidSeed>, Vec<String>> {
    let mut valid = Vec::with_capacity(seeds.len());
    let mut errors = Vec::new();
    for (idx, seed) in seeds.iter().enumerate() {
        let entry = idx + 1;
        let Ok(reviews) = i32::try_from(seed.reviews) else {
            errors.push(format!("entry {entry} ({}): too many reviews", seed.name));
            continue;
        };
        match seed.draft().validate() {
            Ok(draft) => valid.push(ValidSeed { draft, reviews }),
            Err(e) => errors.push(format!("entry {entry} ({}): {e}", seed.name)),
        }
    }
    if errors.is_empty() { Ok(valid) } else { Err(errors) }
}

/// Seed catalog products from a YAML file.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, validation fails, or an insert fails. Inserts run in one
/// transaction, so a failure leaves the catalog unchanged.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url().ok_or("ADMIN_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seeds: Vec<ProductSeed> = serde_yaml::from_str(&content)?;
    info!(products = seeds.len(), "Parsed seed file");

    let seeds = match validate(&seeds) {
        Ok(seeds) => seeds,
        Err(errors) => {
            error!("Seed file validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;
    if clear_existing {
        let deleted = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(deleted, "Cleared existing products");
    }

    for ValidSeed { draft, reviews } in &seeds {
        sqlx::query(
            r"
            INSERT INTO products
                (id, name, description, price, original_price, category, rating,
                 reviews, in_stock, tags, features, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(ProductId::random())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(&draft.category)
        .bind(draft.rating)
        .bind(*reviews)
        .bind(draft.in_stock)
        .bind(&draft.tags)
        .bind(&draft.features)
        .bind(&draft.images)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(inserted = seeds.len(), "Seeding complete!");
    Ok(())
}
