use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The response for requests that match no route.
///
/// Unlike the other endpoints this does not use the standard envelope, the
/// `status` field holds the HTTP status code.
pub async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status": StatusCode::NOT_FOUND.as_u16(), "message": "Route Not Found"})),
    )
        .into_response()
}
