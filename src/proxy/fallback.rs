//! Structured "service unavailable" responses.
//!
//! [`unavailable`] is shared by the explicit `/fallback/{service_name}`
//! route and the proxy's transport-error path, so callers see one
//! 503 contract regardless of how they got there.

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::negotiate::Negotiated;

pub const SUGGESTIONS: &[&str] = &[
    "Try again in a few moments",
    "Check GET /health for the status of every service",
    "Contact support if the problem persists",
];

/// Second path segment of `path`, or `"unknown"`.
///
/// `/api/orders/5` and `/fallback/orders` both yield `orders`.
#[must_use]
pub fn service_name_from_path(path: &str) -> &str {
    path.split('/')
        .filter(|s| !s.is_empty())
        .nth(1)
        .unwrap_or("unknown")
}

#[must_use]
pub fn unavailable(service: &str) -> Response {
    let payload = json!({
        "error": "Service Unavailable",
        "message": format!("The {service} service is currently unavailable."),
        "suggestions": SUGGESTIONS,
    });
    match Negotiated::from_value(&payload) {
        Ok(negotiated) => {
            negotiated.into_response_with(StatusCode::SERVICE_UNAVAILABLE, HeaderMap::new())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode fallback payload");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Handler for `ANY /fallback/{service_name}`.
pub async fn fallback_handler(uri: Uri) -> Response {
    let service = service_name_from_path(uri.path());
    tracing::info!(service = %service, "fallback requested");
    unavailable(service)
}
