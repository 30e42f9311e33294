//! Friends Store Core - Shared domain types.
//!
//! This crate provides the types shared by every Friends Store component:
//! - `admin` - Order management back-office and notification dispatcher
//! - `mailer` - Transactional email functions (order status, contact form)
//! - `storefront` - Public product catalog and WhatsApp checkout
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The optional `postgres` feature adds `sqlx`
//! encode/decode support for the newtypes.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, amounts, emails, order numbers and statuses
//! - [`order`] - Order and line item records, plus the manual order draft
//! - [`product`] - Catalog product record and the staff-editable draft
//! - [`catalog`] - In-memory catalog filtering and sorting
//! - [`notification`] - Wire payloads exchanged with the email functions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod notification;
pub mod order;
pub mod product;
pub mod types;

pub use catalog::{CATEGORIES, CatalogQuery, SortOrder};
pub use notification::{ContactMessage, EmailLineItem, OrderEmailPayload};
pub use order::{DraftLine, NewOrder, NewOrderItem, Order, OrderDraft, OrderDraftError, OrderItem};
pub use product::{Product, ProductDraft, ProductDraftError};
pub use types::*;
