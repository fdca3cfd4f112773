//! Unified error types for the gateway.
//!
//! Defines [`GatewayError`] (process-level failures: config, startup, CLI
//! commands), [`ValidationError`] for config validation failures, and
//! [`ProxyError`], the request-path taxonomy that renders into the
//! structured JSON bodies callers see. All use `thiserror` for `Display`
//! and `Error` derives.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::proxy::fallback;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible
        let _ = write!(buf, "{e}");
    }
    buf
}

/// Render an error and its `source()` chain as `outer: inner: root`.
///
/// hyper's client errors carry the useful detail (connection refused,
/// DNS failure) in their sources rather than in `Display`.
#[must_use]
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = inner.source();
    }
    out
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// Failures on the request path.
///
/// Non-2xx responses from a reachable backend are not represented here:
/// they are relayed to the caller untouched.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Service not found for this path")]
    RouteNotFound,

    #[error("Method {0} not supported")]
    MethodNotSupported(String),

    #[error("Error proxying request to {url}: {message}")]
    UpstreamTransport {
        service: String,
        url: String,
        message: String,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            Self::RouteNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Not Found",
                    "message": self.to_string(),
                })),
            )
                .into_response(),
            Self::MethodNotSupported(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({
                    "error": "Method Not Allowed",
                    "message": self.to_string(),
                })),
            )
                .into_response(),
            Self::UpstreamTransport { service, .. } => fallback::unavailable(&service),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_supported_message_names_method() {
        let err = ProxyError::MethodNotSupported("PURGE".into());
        assert_eq!(err.to_string(), "Method PURGE not supported");
        assert_eq!(err.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn route_not_found_is_404() {
        assert_eq!(
            ProxyError::RouteNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn transport_error_renders_fallback() {
        let err = ProxyError::UpstreamTransport {
            service: "orders".into(),
            url: "http://orders:9/api/orders/5".into(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn error_chain_walks_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let outer = GatewayError::HttpRequest {
            source: Box::new(inner),
        };
        assert_eq!(
            error_chain(&outer),
            "HTTP request failed: connection refused"
        );
    }

    #[test]
    fn validation_error_display_includes_suggestion() {
        let err = ValidationError {
            field: "routes[0].prefix".into(),
            message: "prefix must start with '/'".into(),
            suggestion: Some("did you mean '/api/orders'?".into()),
        };
        assert_eq!(
            err.to_string(),
            "  routes[0].prefix: prefix must start with '/' (did you mean '/api/orders'?)"
        );
    }
}
