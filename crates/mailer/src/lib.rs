//! Friends Store Mailer library.
//!
//! Two small HTTP functions that turn JSON requests into SMTP email:
//! order status notifications for customers, and contact form messages for
//! the store owner. SMTP credentials are read on each request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod templates;

pub use config::{ConfigError, EnvSource, MailerConfig, ProcessEnv, SmtpSettings};
pub use error::EmailError;
pub use routes::router;
pub use services::{EmailSender, MailTransport, OutboxTransport, OutgoingEmail, SmtpTransport};
