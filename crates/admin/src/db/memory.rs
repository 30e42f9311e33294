//! In-memory order and product stores.
//!
//! Behave like the `PostgreSQL` repositories (newest-first listing, cascade on
//! delete, `NotFound` on unknown ids) without a database.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use friends_store_core::{
    NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderNumber, OrderStatus,
    Product, ProductDraft, ProductId,
};

use super::{OrderStore, ProductStore, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order.
    orders: Vec<Order>,
    items: Vec<OrderItem>,
}

/// [`OrderStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    tables: Mutex<Tables>,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let mut tables = self.tables();

        let mut order_number = OrderNumber::generate(now);
        while tables.orders.iter().any(|o| o.order_number == order_number) {
            order_number = OrderNumber::generate(now);
        }

        let order = Order {
            id: OrderId::random(),
            order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            delivery_address: order.delivery_address,
            notes: order.notes,
            total: order.total,
            status: order.status,
            created_at: now,
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let mut tables = self.tables();
        if !tables.orders.iter().any(|o| o.id == item.order_id) {
            return Err(RepositoryError::Conflict(format!(
                "order {} does not exist",
                item.order_id
            )));
        }

        let item = OrderItem {
            id: OrderItemId::random(),
            order_id: item.order_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
            created_at: Utc::now(),
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.tables().orders.iter().rev().cloned().collect();
        // Stable: equal timestamps keep newest-inserted first.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut items: Vec<OrderItem> = self
            .tables()
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != id);
        if tables.orders.len() == before {
            return Err(RepositoryError::NotFound);
        }
        tables.items.retain(|i| i.order_id != id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// [`ProductStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    /// Insertion order.
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn products(&self) -> MutexGuard<'_, Vec<Product>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.products().iter().rev().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products().iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let product = Product {
            id: ProductId::random(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            original_price: draft.original_price,
            category: draft.category,
            rating: draft.rating,
            reviews: 0,
            in_stock: draft.in_stock,
            tags: draft.tags,
            features: draft.features,
            images: draft.images,
            created_at: Utc::now(),
        };
        self.products().push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let mut products = self.products();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *product = Product {
            id: product.id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            original_price: draft.original_price,
            category: draft.category,
            rating: draft.rating,
            reviews: product.reviews,
            in_stock: draft.in_stock,
            tags: draft.tags,
            features: draft.features,
            images: draft.images,
            created_at: product.created_at,
        };
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut products = self.products();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
