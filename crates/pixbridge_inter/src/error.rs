// --- File: crates/pixbridge_inter/src/error.rs ---
use crate::auth::AuthenticationError;
use pixbridge_common::{external_service_error, HttpStatusCode, PixbridgeError};
use thiserror::Error;

/// Inter-specific error types.
#[derive(Error, Debug)]
pub enum InterError {
    /// No valid bearer credential could be obtained
    #[error("Inter authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Error occurred during an Inter API request
    #[error("Inter API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success response from the Inter API
    #[error("Inter API returned {status_code}: {body}")]
    ApiError { status_code: u16, body: String },

    /// Error parsing Inter API response
    #[error("Failed to parse Inter API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Inter configuration
    #[error("Inter configuration error: {0}")]
    ConfigError(String),

    /// The provider reported a status this service does not know
    #[error("Unrecognized Inter status: {0}")]
    UnrecognizedStatus(String),

    /// A field the integration relies on was absent from the response
    #[error("Inter response is missing field: {0}")]
    MissingField(String),
}

/// Convert InterError to PixbridgeError
impl From<InterError> for PixbridgeError {
    fn from(err: InterError) -> Self {
        match err {
            InterError::Authentication(e) => PixbridgeError::AuthError(e.to_string()),
            InterError::RequestError(e) => {
                if e.is_timeout() {
                    PixbridgeError::TimeoutError(format!("Inter request timed out: {}", e))
                } else {
                    external_service_error("Inter API", e)
                }
            }
            // provider 400/404 say something about the caller's input; the
            // rest is an upstream failure
            InterError::ApiError { status_code, body } => match status_code {
                400 | 422 => PixbridgeError::ValidationError(body),
                404 => PixbridgeError::NotFoundError(body),
                _ => external_service_error(
                    "Inter API",
                    format!("Status: {}, Body: {}", status_code, body),
                ),
            },
            InterError::ParseError(e) => {
                external_service_error("Inter API", format!("unparseable response: {}", e))
            }
            InterError::ConfigError(msg) => PixbridgeError::ConfigError(msg),
            InterError::UnrecognizedStatus(status) => {
                external_service_error("Inter API", format!("unrecognized status {}", status))
            }
            InterError::MissingField(field) => {
                external_service_error("Inter API", format!("missing field {}", field))
            }
        }
    }
}

impl HttpStatusCode for InterError {
    fn status_code(&self) -> u16 {
        match self {
            InterError::Authentication(_) => 502,
            InterError::RequestError(e) if e.is_timeout() => 504,
            InterError::RequestError(_) => 502,
            InterError::ApiError { status_code, .. } => match status_code {
                400 | 422 => 400,
                404 => 404,
                _ => 502,
            },
            InterError::ParseError(_) => 502,
            InterError::ConfigError(_) => 500,
            InterError::UnrecognizedStatus(_) => 502,
            InterError::MissingField(_) => 502,
        }
    }
}
