//! The JSON envelope that wraps every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Whether a request succeeded, as reported in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request was handled.
    Success,
    /// The request failed, the message says why.
    Error,
}

/// The body of every API response, `{"status": .., "message": .., "data": ..}`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub status: ResponseStatus,
    /// A short human readable description of the outcome.
    pub message: String,
    /// The payload, `null` for errors and for operations without a result.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.to_owned(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A failed response with no payload.
    pub fn error(message: &str) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.to_owned(),
            data: None,
        }
    }
}

/// Serialize `body` as JSON with `status_code`.
pub(crate) fn render<T: Serialize>(status_code: StatusCode, body: ApiResponse<T>) -> Response {
    (status_code, Json(body)).into_response()
}

/// Serialize a successful response with the status code 200 OK.
pub(crate) fn success<T: Serialize>(message: &str, data: T) -> Response {
    render(StatusCode::OK, ApiResponse::success(message, data))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ApiResponse;

    #[test]
    fn error_has_null_data() {
        let got = serde_json::to_value(ApiResponse::error("Transaction not found")).unwrap();

        assert_eq!(
            got,
            json!({"status": "error", "message": "Transaction not found", "data": null})
        );
    }

    #[test]
    fn success_wraps_data() {
        let got = serde_json::to_value(ApiResponse::success("ok", vec![1, 2])).unwrap();

        assert_eq!(got, json!({"status": "success", "message": "ok", "data": [1, 2]}));
    }
}
