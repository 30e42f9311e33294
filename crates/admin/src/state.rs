//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;

use crate::db::ProductStore;
use crate::services::OrderWorkflow;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    access_token: SecretString,
    workflow: OrderWorkflow,
    products: Arc<dyn ProductStore>,
}

impl AppState {
    /// Build state from the sign-in token, the order workflow and the catalog store.
    #[must_use]
    pub fn new(
        access_token: SecretString,
        workflow: OrderWorkflow,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                access_token,
                workflow,
                products,
            }),
        }
    }

    /// Token staff sign in with.
    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.inner.access_token
    }

    /// Order operations.
    #[must_use]
    pub fn workflow(&self) -> &OrderWorkflow {
        &self.inner.workflow
    }

    /// Catalog storage.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }
}
