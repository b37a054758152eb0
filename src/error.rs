// src/error.rs

//! Unified error handling for the application.

use std::fmt;

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document or record does not exist
    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    /// Scraping error for a single source
    #[error("Scrape error for {source_name}: {message}")]
    Scrape {
        source_name: String,
        message: String,
    },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for a collection entry.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a scrape error for a named source.
    pub fn scrape(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Scrape {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "server")]
mod response {
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde_json::json;

    use super::AppError;

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = match self {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            if status.is_server_error() {
                log::error!("Request failed: {}", self);
            }

            let body = json!({ "success": false, "error": self.to_string() });
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("trips", "abc");
        assert_eq!(err.to_string(), "trips 'abc' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_is_not_not_found() {
        assert!(!AppError::validation("bad").is_not_found());
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_response_status_codes() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let status = |err: AppError| err.into_response().status();
        assert_eq!(status(AppError::validation("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::not_found("trips", "abc")), StatusCode::NOT_FOUND);
        assert_eq!(
            status(AppError::scrape("tours", "timeout")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::config("missing listen address")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
