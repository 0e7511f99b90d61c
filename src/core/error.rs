//! Typed error handling for the order pipeline
//!
//! Callers that need to react to a specific failure match on [`StoreError`]
//! instead of inspecting an opaque `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: order drafts rejected before any dispatch
//! - [`NotificationError`]: notification sink failures
//! - [`LogError`]: order log read/write failures
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: malformed HTTP requests
//!
//! # Example
//!
//! ```rust,ignore
//! use blouza::prelude::*;
//!
//! match draft.to_order(Category::Men) {
//!     Ok(order) => dispatcher.dispatch(order).await,
//!     Err(StoreError::Validation(ValidationError::FieldErrors(fields))) => {
//!         for f in fields {
//!             eprintln!("{}: {}", f.field, f.message);
//!         }
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum StoreError {
    /// Order draft failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Notification sink errors
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Order log errors
    #[error(transparent)]
    Log(#[from] LogError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation(e) => e.status_code(),
            StoreError::Notification(_) => StatusCode::BAD_GATEWAY,
            StoreError::Log(e) => e.status_code(),
            StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::Request(e) => e.status_code(),
            StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Validation(e) => e.error_code(),
            StoreError::Notification(e) => e.error_code(),
            StoreError::Log(e) => e.error_code(),
            StoreError::Config(_) => "CONFIG_ERROR",
            StoreError::Request(e) => e.error_code(),
            StoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StoreError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            StoreError::Notification(NotificationError::Rejected { status, .. }) => {
                Some(serde_json::json!({ "status": status }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised while turning a draft into an order
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more fields failed validation
    #[error("{}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Category text outside the three known values
    #[error("Unknown category: {value}")]
    UnknownCategory { value: String },

}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    let msgs: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();
    format!("Validation errors: {}", msgs.join(", "))
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
        }
    }

    /// Field names carried by a `FieldErrors` value
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Notification Errors
// =============================================================================

/// Errors from the notification sink
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The relay or the bot API answered with a non-success status
    #[error("Notification rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never got a response
    #[error("Notification transport error: {message}")]
    Transport { message: String },

    /// No credentials configured
    #[error("Notifications are disabled")]
    Disabled,
}

impl NotificationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            NotificationError::Rejected { .. } => "NOTIFICATION_REJECTED",
            NotificationError::Transport { .. } => "NOTIFICATION_TRANSPORT_ERROR",
            NotificationError::Disabled => "NOTIFICATION_DISABLED",
        }
    }
}

// =============================================================================
// Log Errors
// =============================================================================

/// Errors from the order log
#[derive(Debug, Error)]
pub enum LogError {
    /// The log could not be fetched
    #[error("Erreur lors du chargement des commandes: {message}")]
    Unavailable { message: String },
}

impl LogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LogError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LogError::Unavailable { .. } => "ORDER_LOG_UNAVAILABLE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{f}'"))
        .unwrap_or_default()
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Invalid request body
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Resource does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StoreError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(store_err) => store_err,
            Err(err) => StoreError::Internal(err.to_string()),
        }
    }
}

/// A specialized Result type for the order pipeline
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Tests
// =============================================================================
