//! Error handling for the email functions.
//!
//! Every failure answers `500 {"error": "<message>"}`; callers treat the
//! functions as fire-and-forget and only log the message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lettre::transport::smtp::Error as SmtpError;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while handling an email request.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP settings are missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Request body could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidPayload(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),
}

impl IntoResponse for EmailError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Template(_) | Self::Smtp(_) | Self::MessageBuild(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Email function error"
            );
        } else {
            tracing::warn!(error = %self, "Email request rejected");
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
