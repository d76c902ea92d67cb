//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`.
//! Bodies are JSON: `{"error": "..."}`, or `{"errors": {field: [...]}}` for
//! validation failures.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::db::RepositoryError;
use crate::services::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order workflow rejected or failed the request.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request body failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Order(err) => match err {
                OrderError::ItemUnavailable(_)
                | OrderError::InsufficientStock(_)
                | OrderError::EmptyOrder
                | OrderError::TooManyLines
                | OrderError::QuantityOutOfRange(_)
                | OrderError::TotalTooLarge
                | OrderError::InvalidState(_) => StatusCode::BAD_REQUEST,
                OrderError::NotFound => StatusCode::NOT_FOUND,
                OrderError::Uninitialized
                | OrderError::Persistence(_)
                | OrderError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> String {
        match self {
            Self::Order(OrderError::Uninitialized) => "Restaurant not initialized".to_string(),
            Self::Order(OrderError::Persistence(_) | OrderError::Signing(_)) => {
                "Internal server error".to_string()
            }
            Self::Order(err) => err.to_string(),
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(_)) => "Conflict".to_string(),
            Self::Database(_) => "Internal server error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
            Self::Validation(_) => "Validation failed".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match &self {
            Self::Validation(errors) => json!({ "errors": flatten_validation(errors) }),
            _ => json!({ "error": self.message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Flatten nested validation errors into `{"items[0].quantity": ["..."]}`.
fn flatten_validation(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_validation("", errors, &mut out);
    out
}

fn collect_validation(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = list
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                out.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_validation(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Add a breadcrumb for workflow steps.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roomservice_core::MenuItemId;
    use validator::ValidationError;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order".to_string());
        assert_eq!(err.to_string(), "Not found: Order");

        let err = AppError::from(OrderError::InsufficientStock("Fish Amok".to_string()));
        assert_eq!(err.to_string(), "Not enough stock for Fish Amok.");
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(OrderError::ItemUnavailable(MenuItemId::generate()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::InvalidState("no".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::QuantityOutOfRange(i32::MAX).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::TotalTooLarge.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::TooManyLines.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(OrderError::Uninitialized.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_status_codes() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "order 42 has no lines".to_string(),
        ));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_flatten_validation() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("length");
        error.message = Some("an order needs at least one item".into());
        errors.add("items", error);

        let flat = flatten_validation(&errors);
        assert_eq!(
            flat.get("items").unwrap(),
            &vec!["an order needs at least one item".to_string()]
        );
    }
}
