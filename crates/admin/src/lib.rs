//! Friends Store Admin library.
//!
//! Order back-office: staff sign in, browse orders grouped by status,
//! change statuses, create manual orders and delete orders. Every change
//! triggers a best-effort customer email through the mailer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
