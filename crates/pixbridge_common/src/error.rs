// --- File: crates/pixbridge_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all pixbridge crates.
///
/// Each crate keeps its own error enum and implements `From<CrateError>` for
/// `PixbridgeError`, which is what the HTTP layer turns into a response.
#[derive(Error, Debug)]
pub enum PixbridgeError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Credential acquisition against the provider failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PixbridgeError {
    fn status_code(&self) -> u16 {
        match self {
            PixbridgeError::HttpError(_) => 500,
            PixbridgeError::ParseError(_) => 400,
            PixbridgeError::ConfigError(_) => 500,
            PixbridgeError::AuthError(_) => 502,
            PixbridgeError::ValidationError(_) => 400,
            PixbridgeError::DatabaseError(_) => 500,
            PixbridgeError::ExternalServiceError { .. } => 502,
            PixbridgeError::NotFoundError(_) => 404,
            PixbridgeError::TimeoutError(_) => 504,
            PixbridgeError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for PixbridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PixbridgeError::TimeoutError(err.to_string())
        } else {
            PixbridgeError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PixbridgeError {
    fn from(err: serde_json::Error) -> Self {
        PixbridgeError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> PixbridgeError {
    PixbridgeError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> PixbridgeError {
    PixbridgeError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> PixbridgeError {
    PixbridgeError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> PixbridgeError {
    PixbridgeError::InternalError(message.to_string())
}
