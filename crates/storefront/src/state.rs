//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::Catalog;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Catalog,
    whatsapp_number: String,
}

impl AppState {
    /// Build state from the catalog and the store's WhatsApp number.
    #[must_use]
    pub fn new(catalog: Catalog, whatsapp_number: String) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                whatsapp_number,
            }),
        }
    }

    /// Product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Number purchase chats are opened with.
    #[must_use]
    pub fn whatsapp_number(&self) -> &str {
        &self.inner.whatsapp_number
    }
}
