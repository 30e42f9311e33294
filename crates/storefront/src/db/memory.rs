//! Fixed in-memory catalog.

use async_trait::async_trait;

use friends_store_core::{Product, ProductId};

use super::{ProductSource, RepositoryError};

/// [`ProductSource`] over a fixed product list, kept in the given order.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Serve `products`, which should already be newest first.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductSource for StaticCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
