//! Middleware for logging requests and responses.

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Bodies that may be larger than [LOG_BODY_BUFFER_LIMIT] bytes are passed
/// through unread and only their heads are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = if fits_in_buffer(&body) {
        let body_bytes = match axum::body::to_bytes(body, LOG_BODY_BUFFER_LIMIT).await {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("Could not read request body: {error}");
                return (StatusCode::BAD_REQUEST, "could not read request body").into_response();
            }
        };
        log_request(&parts, &String::from_utf8_lossy(&body_bytes));
        Body::from(body_bytes)
    } else {
        log_request(&parts, "<body not buffered>");
        body
    };

    let response = next.run(Request::from_parts(parts, body)).await;

    let (parts, body) = response.into_parts();
    let body = if fits_in_buffer(&body) {
        let body_bytes = match axum::body::to_bytes(body, LOG_BODY_BUFFER_LIMIT).await {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::error!("Could not read response body: {error}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        log_response(&parts, &String::from_utf8_lossy(&body_bytes));
        Body::from(body_bytes)
    } else {
        log_response(&parts, "<body not buffered>");
        body
    };

    Response::from_parts(parts, body)
}

/// The largest body, in bytes, that is read into memory for logging.
pub const LOG_BODY_BUFFER_LIMIT: usize = 64 * 1024;

/// Whether `body` is known to be no larger than [LOG_BODY_BUFFER_LIMIT].
fn fits_in_buffer(body: &Body) -> bool {
    body.size_hint()
        .upper()
        .is_some_and(|size| size <= LOG_BODY_BUFFER_LIMIT as u64)
}

/// The number of bytes of a body to include in the `info` level logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Cut `body` down to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}
