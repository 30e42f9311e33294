//! The order and product store boundaries.

use async_trait::async_trait;
use friends_store_core::{
    NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatus, Product, ProductDraft,
    ProductId,
};

use super::RepositoryError;

/// Persistence for orders and their line items.
///
/// Implementations hand back fully typed records; a row that cannot be
/// converted is reported as `RepositoryError::DataCorruption`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order. The store assigns the id, order number and timestamp.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Insert one line item.
    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError>;

    /// Fetch an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// All orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Items of one order, oldest first. Unknown orders have no items.
    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError>;

    /// Set the status of an order and return the stored row.
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError>;

    /// Delete an order together with its items.
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Persistence for catalog products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Fetch a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product with no reviews.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Replace the editable fields of a product and return the stored row.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError>;

    /// Delete a product.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}
