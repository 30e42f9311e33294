//! Cached catalog.
//!
//! The whole product list is loaded from the [`ProductSource`] and cached
//! with `moka` for 5 minutes. Filtering and sorting happen in memory on the
//! cached list.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use friends_store_core::{CatalogQuery, Product, ProductId};

use crate::db::{ProductSource, RepositoryError};

/// How long a loaded product list is served before reloading.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Read access to the product catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    source: Arc<dyn ProductSource>,
    // Single entry: the full product list.
    cache: Cache<(), Arc<Vec<Product>>>,
}

impl Catalog {
    /// Create a catalog backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { source, cache }),
        }
    }

    /// The underlying product source.
    #[must_use]
    pub fn source(&self) -> &dyn ProductSource {
        self.inner.source.as_ref()
    }

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list is not cached and cannot be loaded.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.inner.cache.get(&()).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(self.inner.source.list_products().await?);
        self.inner.cache.insert((), products.clone()).await;
        Ok(products)
    }

    /// Products matching `query`, in the query's sort order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn search(&self, query: &CatalogQuery) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products().await?;
        Ok(query.apply(&products).into_iter().cloned().collect())
    }

    /// One product. Falls back to the source for products newer than the
    /// cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the source cannot be queried.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(product) = self.products().await?.iter().find(|p| p.id == id) {
            return Ok(Some(product.clone()));
        }
        self.inner.source.get_product(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use friends_store_core::{Amount, SortOrder};

    use super::*;
    use crate::db::StaticCatalog;

    fn product(name: &str, price: u32) -> Product {
        Product {
            id: ProductId::random(),
            name: name.to_string(),
            description: String::new(),
            price: Amount::from_rupees(price),
            original_price: None,
            category: "Small Plants".to_string(),
            rating: 4.0,
            reviews: 3,
            in_stock: true,
            tags: vec![],
            features: vec![],
            images: vec![],
            created_at: Utc::now(),
        }
    }

    /// Counts list calls so cache hits can be observed.
    struct CountingSource {
        products: Vec<Product>,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl ProductSource for CountingSource {
        async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.clone())
        }

        async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(self.products.iter().find(|p| p.id == id).cloned())
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_product_list_is_cached() {
        let source = Arc::new(CountingSource {
            products: vec![product("Fern", 900), product("Aloe", 300)],
            loads: AtomicUsize::new(0),
        });
        let catalog = Catalog::new(source.clone());

        assert_eq!(catalog.products().await.unwrap().len(), 2);
        assert_eq!(catalog.products().await.unwrap().len(), 2);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_applies_query() {
        let catalog = Catalog::new(Arc::new(StaticCatalog::new(vec![
            product("Fern", 900),
            product("Aloe", 300),
        ])));
        let query = CatalogQuery {
            sort: SortOrder::PriceLowToHigh,
            ..CatalogQuery::default()
        };

        let names: Vec<String> = catalog
            .search(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Aloe", "Fern"]);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let catalog = Catalog::new(Arc::new(StaticCatalog::default()));
        assert!(catalog.product(ProductId::random()).await.unwrap().is_none());
    }
}
