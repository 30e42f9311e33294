//! Friends Store Storefront library.
//!
//! Public catalog API over the `products` table and the WhatsApp checkout
//! redirect. Exposed as a library so the router can be tested without a
//! database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
