//! Order status workflow.
//!
//! Every operation staff can perform on an order. Mutations go to the store
//! first; the customer is notified only after the store has accepted the
//! change, and a failed notification never fails the operation.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use friends_store_core::{
    Order, OrderDraft, OrderDraftError, OrderId, OrderItem, OrderNumber, OrderStatus,
    StatusFilter,
};

use super::notify::{NotifyOutcome, OrderNotifier};
use crate::db::{OrderStore, RepositoryError};

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The entered order is incomplete or invalid.
    #[error(transparent)]
    InvalidDraft(#[from] OrderDraftError),

    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// The order was stored but one of its items was not. Nothing is rolled back.
    #[error("order {order_number} was created, but item {line} could not be saved: {source}")]
    PartialCreate {
        order_number: OrderNumber,
        line: usize,
        #[source]
        source: RepositoryError,
    },

    /// The store rejected the operation.
    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for WorkflowError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Orders of one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroup {
    pub status: OrderStatus,
    /// Newest first.
    pub orders: Vec<Order>,
}

/// All orders grouped by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBoard {
    /// One group per status, in lifecycle order.
    pub groups: Vec<StatusGroup>,
}

impl OrderBoard {
    /// Group a newest-first order list by status.
    #[must_use]
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let groups = OrderStatus::ALL
            .iter()
            .map(|status| StatusGroup {
                status: *status,
                orders: orders
                    .iter()
                    .filter(|o| o.status == *status)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    /// Number of orders with `status`.
    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.groups
            .iter()
            .find(|g| g.status == status)
            .map_or(0, |g| g.orders.len())
    }

    /// Number of orders across all statuses.
    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.orders.len()).sum()
    }

    /// Groups to display under `filter`.
    ///
    /// `All` shows every non-empty group; a single status is shown even when
    /// it has no orders.
    #[must_use]
    pub fn visible(&self, filter: StatusFilter) -> Vec<&StatusGroup> {
        self.groups
            .iter()
            .filter(|g| match filter {
                StatusFilter::All => !g.orders.is_empty(),
                StatusFilter::Only(status) => g.status == status,
            })
            .collect()
    }
}

/// What the order details panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemsState {
    Loaded(Vec<OrderItem>),
    Empty,
    Failed(String),
}

/// Order operations available to staff.
#[derive(Clone)]
pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    notifier: OrderNotifier,
}

impl OrderWorkflow {
    /// Create a workflow over `store`, notifying through `notifier`.
    pub fn new(store: Arc<dyn OrderStore>, notifier: OrderNotifier) -> Self {
        Self { store, notifier }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn OrderStore {
        self.store.as_ref()
    }

    /// Load every order, grouped by status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Store` if the orders cannot be loaded.
    #[instrument(skip(self))]
    pub async fn board(&self) -> Result<OrderBoard, WorkflowError> {
        let orders = self.store.list_orders().await?;
        Ok(OrderBoard::from_orders(orders))
    }

    /// Change the status of an order, then notify the customer with the
    /// status the store reports back.
    ///
    /// Any status may follow any other, including the current one.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` for an unknown order, or
    /// `WorkflowError::Store` if the update fails. Notification problems are
    /// reported in the outcome, never as an error.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(Order, NotifyOutcome), WorkflowError> {
        let order = self.store.update_status(order_id, status).await?;
        tracing::info!(order_number = %order.order_number, status = %order.status, "Order status updated");

        let outcome = self.notifier.notify(order.id, order.status).await;
        Ok((order, outcome))
    }

    /// Create a manual order with status `received`, insert its items one by
    /// one, then notify the customer.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDraft` before touching the store if the
    /// draft is invalid, `WorkflowError::Store` if the order insert fails, or
    /// `WorkflowError::PartialCreate` if an item insert fails after the order
    /// was stored. No notification is sent on error.
    #[instrument(skip(self, draft), fields(customer = %draft.customer_name))]
    pub async fn create_order(
        &self,
        draft: OrderDraft,
    ) -> Result<(Order, NotifyOutcome), WorkflowError> {
        let (new_order, lines) = draft.into_parts()?;
        let order = self.store.create_order(new_order).await?;

        for (idx, line) in lines.iter().enumerate() {
            if let Err(source) = self.store.insert_item(line.for_order(order.id)).await {
                tracing::error!(
                    order_number = %order.order_number,
                    line = idx + 1,
                    error = %source,
                    "Order created without all of its items"
                );
                return Err(WorkflowError::PartialCreate {
                    order_number: order.order_number,
                    line: idx + 1,
                    source,
                });
            }
        }

        tracing::info!(
            order_number = %order.order_number,
            items = lines.len(),
            total = %order.total,
            "Order created"
        );

        let outcome = self.notifier.notify(order.id, OrderStatus::Received).await;
        Ok((order, outcome))
    }

    /// Delete an order; its items go with it.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` for an unknown order, or
    /// `WorkflowError::Store` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), WorkflowError> {
        self.store.delete_order(order_id).await?;
        tracing::info!(%order_id, "Order deleted");
        Ok(())
    }

    /// Items of an order, oldest first, for the details panel.
    #[instrument(skip(self))]
    pub async fn order_items(&self, order_id: OrderId) -> ItemsState {
        match self.store.list_items(order_id).await {
            Ok(items) if items.is_empty() => ItemsState::Empty,
            Ok(items) => ItemsState::Loaded(items),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load order items");
                ItemsState::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use friends_store_core::{Amount, DraftLine};
    use reqwest::Client;

    use super::*;
    use crate::db::MemoryOrderStore;
    use crate::services::notify::SkipReason;

    fn workflow() -> (OrderWorkflow, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = OrderNotifier::new(store.clone(), Client::new(), None);
        (OrderWorkflow::new(store.clone(), notifier), store)
    }

    fn line(name: &str, quantity: u32, rupees: u32) -> DraftLine {
        DraftLine {
            product_name: name.to_string(),
            quantity,
            price: Amount::from_rupees(rupees),
        }
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            customer_name: "Asha Patel".to_string(),
            customer_email: "asha@plants.in".to_string(),
            customer_phone: "+91 98765 43210".to_string(),
            delivery_address: "12 MG Road, Pune".to_string(),
            notes: String::new(),
            items: vec![line("Monstera", 2, 100), line("Fern", 1, 50)],
        }
    }

    #[tokio::test]
    async fn test_create_order_stores_order_and_items() {
        let (workflow, store) = workflow();
        let (order, outcome) = workflow.create_order(draft()).await.unwrap();

        assert_eq!(order.total, Amount::from_rupees(250));
        assert_eq!(order.status, OrderStatus::Received);
        assert!(order.order_number.as_str().starts_with("FS-"));
        assert_eq!(store.list_items(order.id).await.unwrap().len(), 2);
        assert_eq!(outcome, NotifyOutcome::Skipped(SkipReason::NoEndpoint));
    }

    #[tokio::test]
    async fn test_invalid_draft_touches_nothing() {
        let (workflow, store) = workflow();
        let mut d = draft();
        d.items.clear();

        assert!(matches!(
            workflow.create_order(d).await,
            Err(WorkflowError::InvalidDraft(OrderDraftError::NoItems))
        ));
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_allows_any_transition() {
        let (workflow, _) = workflow();
        let (order, _) = workflow.create_order(draft()).await.unwrap();

        let (order, _) = workflow
            .update_status(order.id, OrderStatus::Dispatched)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Dispatched);

        let (order, _) = workflow
            .update_status(order.id, OrderStatus::Received)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let (workflow, _) = workflow();
        assert!(matches!(
            workflow
                .update_status(OrderId::random(), OrderStatus::Completed)
                .await,
            Err(WorkflowError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_board_groups_and_counts() {
        let (workflow, _) = workflow();
        let (a, _) = workflow.create_order(draft()).await.unwrap();
        workflow.create_order(draft()).await.unwrap();
        workflow
            .update_status(a.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let board = workflow.board().await.unwrap();
        assert_eq!(board.total(), 2);
        assert_eq!(board.count(OrderStatus::Received), 1);
        assert_eq!(board.count(OrderStatus::Cancelled), 1);
        assert_eq!(board.count(OrderStatus::Returned), 0);

        let visible: Vec<OrderStatus> = board
            .visible(StatusFilter::All)
            .iter()
            .map(|g| g.status)
            .collect();
        assert_eq!(visible, [OrderStatus::Received, OrderStatus::Cancelled]);

        let only = board.visible(StatusFilter::Only(OrderStatus::Returned));
        assert_eq!(only.len(), 1);
        assert!(only[0].orders.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_items_states() {
        let (workflow, _) = workflow();
        let (order, _) = workflow.create_order(draft()).await.unwrap();

        assert!(matches!(
            workflow.order_items(order.id).await,
            ItemsState::Loaded(items) if items.len() == 2
        ));

        workflow.delete_order(order.id).await.unwrap();
        assert_eq!(workflow.order_items(order.id).await, ItemsState::Empty);
        assert!(workflow.board().await.unwrap().total() == 0);
        assert!(matches!(
            workflow.delete_order(order.id).await,
            Err(WorkflowError::NotFound)
        ));
    }
}
