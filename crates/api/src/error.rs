//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; every failure is rendered as the shared
//! `{ success: false, message }` envelope with an appropriate status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::orders::OrderError;
use crate::response::ApiResponse;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement or transition failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Request body or parameters failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server fault worth reporting to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(e) => {
                !matches!(e, RepositoryError::NotFound | RepositoryError::Conflict(_))
            }
            Self::Auth(e) => matches!(e, AuthError::PasswordHash | AuthError::Repository(_)),
            Self::Order(e) => matches!(e, OrderError::Repository(_)),
            Self::Internal(_) => true,
            _ => false,
        }
    }

    /// HTTP status for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(e) => match e {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailTaken | AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Order(e) => match e {
                OrderError::ProductNotFound { .. } => StatusCode::NOT_FOUND,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn public_message(&self) -> String {
        match self {
            Self::Database(e) => match e {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_string(),
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::EmailTaken => {
                    "An account with this email already exists".to_string()
                }
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Order(e) => match e {
                OrderError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::InvalidInput(msg) | Self::NotFound(msg) | Self::Forbidden(msg)
            | Self::Unauthorized(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ApiResponse::failure(self.public_message());

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::ProductId;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        assert_eq!(
            status_of(AppError::InvalidInput("No order items".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::InsufficientStock {
                name: "Widget".into()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_product_maps_to_404() {
        assert_eq!(
            status_of(AppError::Order(OrderError::ProductNotFound {
                id: ProductId::generate()
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::NotFound("Order not found".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_access_errors() {
        assert_eq!(
            status_of(AppError::Forbidden("Not authorized to view this order".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Unauthorized("Not logged in".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("connection pool exhausted".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_insufficient_stock_message_names_product() {
        let err = AppError::Order(OrderError::InsufficientStock {
            name: "Walnut Desk".into(),
        });
        assert_eq!(err.public_message(), "Insufficient stock for Walnut Desk");
    }
}
