// API response utility functions module

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string_pretty(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"detail":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// 200 response with a `{"message": ...}` body
pub fn message(text: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "message": text }))
}

/// Error response with a `{"detail": ...}` body
pub fn detail(status: StatusCode, text: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "detail": text }))
}

/// 404 Not Found response for unknown API paths
pub fn not_found() -> Response<Full<Bytes>> {
    detail(StatusCode::NOT_FOUND, "Not Found")
}

/// 422 response for a missing required query parameter.
///
/// Request validation failures are signaled before any store access.
pub fn missing_param(name: &str) -> Response<Full<Bytes>> {
    detail(
        StatusCode::UNPROCESSABLE_ENTITY,
        &format!("Missing required query parameter: {name}"),
    )
}
