//! Single-attempt forwarding of one request to one backend.
//!
//! [`ProxiedRequest`] captures what is sent upstream; [`forward`] performs
//! exactly one call under a deadline that covers both the response head
//! and the body. There is no retry here: a repeated write could duplicate
//! a side effect on the backend.

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use super::headers::build_forwarded_headers;
use crate::error::error_chain;
use crate::server::HttpClient;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid target URL '{url}': {message}")]
    InvalidTarget { url: String, message: String },

    #[error("{0}")]
    Request(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Methods whose body is forwarded. Others are sent without one.
#[must_use]
pub fn method_carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

#[derive(Debug, Clone)]
pub struct ProxiedRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, forwarded verbatim so order and repeated keys survive.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxiedRequest {
    #[must_use]
    pub fn new(method: Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Self {
        let body = if method_carries_body(&method) {
            body
        } else {
            Bytes::new()
        };
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: build_forwarded_headers(headers),
            body,
        }
    }

    /// `backend + path`, plus the original query string.
    #[must_use]
    pub fn target_url(&self, backend: &str) -> String {
        match &self.query {
            Some(q) => format!("{backend}{}?{q}", self.path),
            None => format!("{backend}{}", self.path),
        }
    }
}

#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub async fn forward(
    client: &HttpClient,
    target_url: &str,
    request: ProxiedRequest,
    timeout: Duration,
) -> Result<ProxiedResponse, TransportError> {
    let uri: hyper::Uri = target_url
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| TransportError::InvalidTarget {
            url: target_url.to_string(),
            message: e.to_string(),
        })?;

    let mut builder = hyper::Request::builder().method(request.method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = request.headers;
    }
    let outbound = builder
        .body(Full::new(request.body))
        .map_err(|e| TransportError::InvalidTarget {
            url: target_url.to_string(),
            message: e.to_string(),
        })?;

    let call = async {
        let response = client
            .request(outbound)
            .await
            .map_err(|e| TransportError::Request(error_chain(&e)))?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TransportError::Body(error_chain(&e)))?
            .to_bytes();
        Ok::<_, TransportError>(ProxiedResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    };

    // Dropping `call` on timeout or client disconnect releases the pooled connection.
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
}
