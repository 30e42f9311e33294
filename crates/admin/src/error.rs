//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use friends_store_core::ProductDraftError;

use crate::db::RepositoryError;
use crate::services::WorkflowError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// An order operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The entered product is invalid.
    #[error(transparent)]
    InvalidProduct(#[from] ProductDraftError),

    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Workflow(WorkflowError::InvalidDraft(_)) | Self::InvalidProduct(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Workflow(WorkflowError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Workflow(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the operator.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Workflow(WorkflowError::Store(_)) => {
                "The order store rejected the change. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Log server errors and report them to Sentry.
    pub fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::warn!(error = %self, "Admin request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.operator_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use friends_store_core::{OrderDraftError, OrderNumber};

    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Workflow(WorkflowError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Workflow(WorkflowError::InvalidDraft(OrderDraftError::NoItems)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidProduct(ProductDraftError::MissingName).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::NotFound("product".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_partial_create_names_the_order() {
        let err = AppError::Workflow(WorkflowError::PartialCreate {
            order_number: OrderNumber::from_existing("FS-20260307-K7Q2M".to_string()),
            line: 2,
            source: RepositoryError::Conflict("quantity out of range".to_string()),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.operator_message().contains("FS-20260307-K7Q2M"));
        assert!(err.operator_message().contains("item 2"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("row 7".to_string()));
        assert_eq!(err.operator_message(), "Internal server error");
    }
}
