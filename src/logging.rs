//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// JSON keys whose values are replaced before a body is logged.
const REDACTED_KEYS: [&str; 3] = ["password", "access", "refresh"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// The method, URI and status are logged at the `info` level along with the
/// body truncated to [LOG_BODY_LENGTH_LIMIT] characters. The full body is
/// logged at the `debug` level. Passwords and tokens in JSON bodies are
/// redacted. Headers are not logged since they carry the bearer token.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = match extract_parts_and_body_text_from_request(request).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => return error.into_response(),
    };
    log_request(&parts, &redact_json(&body_text));

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = match extract_parts_and_body_text_from_response(response).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => return error.into_response(),
    };
    log_response(&parts, &redact_json(&body_text));

    Response::from_parts(parts, body_text.into())
}

/// Replace the values of [REDACTED_KEYS] anywhere in a JSON document.
///
/// Text that is not JSON is returned unchanged.
fn redact_json(body_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    redact_value(&mut value);
    value.to_string()
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED_VALUE.to_owned());
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

async fn extract_parts_and_body_text_from_request(
    request: Request,
) -> Result<(request::Parts, String), Error> {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| Error::MalformedBody(error.to_string()))?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

async fn extract_parts_and_body_text_from_response(
    response: Response,
) -> Result<(response::Parts, String), Error> {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| Error::ResponseBodyError(error.to_string()))?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is
/// short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!(
                "Received request: {} {}\nbody: {truncated}...",
                parts.method,
                parts.uri
            );
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        ),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {}\nbody: {truncated}...", parts.status);
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {}\nbody: {body:?}", parts.status),
    }
}
