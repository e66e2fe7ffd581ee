// --- File: crates/pixbridge_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, PixbridgeError};

pub mod client;

/// Renders the error as `{"error": {"message", "code"}}` with the mapped status.
impl IntoResponse for PixbridgeError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::not_found;

    #[test]
    fn test_error_into_response_status() {
        let response = not_found("charge abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
