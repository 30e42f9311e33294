//! Storefront services.

pub mod catalog;
pub mod whatsapp;

pub use catalog::Catalog;
pub use whatsapp::{purchase_message, purchase_url};
