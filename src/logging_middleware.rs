// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, enabled, Level};

use crate::common::truncate_for_log;

/// Longest string value written to the log as-is
const MAX_LOGGED_VALUE_CHARS: usize = 96;

/// Middleware to log JSON request and response bodies at debug level
///
/// Passwords are masked and long strings (base64 uploads) are shortened.
/// Non-JSON bodies, such as served blobs, are passed through untouched.
/// Bodies are buffered up to `max_body_bytes`; larger requests get a 413.
pub async fn log_request_response(
    State(max_body_bytes): State<usize>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, max_body_bytes)
            .await
            .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

        if let Some(body) = redacted_body(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body,
                "📥 Request"
            );
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = redacted_body(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %body,
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn redacted_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(body_str) {
        Ok(mut json) => {
            redact(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()))
        }
        Err(_) => Some(truncate_for_log(body_str, MAX_LOGGED_VALUE_CHARS)),
    }
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key.contains("password") || key == "access_token" {
                    *v = Value::String("***".to_string());
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        Value::String(s) if s.chars().count() > MAX_LOGGED_VALUE_CHARS => {
            *s = truncate_for_log(s, MAX_LOGGED_VALUE_CHARS);
        }
        _ => {}
    }
}
