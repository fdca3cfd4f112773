//! Response content negotiation.
//!
//! Upstream bodies that are valid JSON are relayed as JSON; everything
//! else (HTML, plain text, binary, empty bodies) is relayed with the
//! upstream content type. Either way the bytes are the upstream's own:
//! JSON is only checked, never re-encoded, so number precision, key order
//! and formatting survive. The fallback responder builds its payload
//! through the same type.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use serde::de::IgnoredAny;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiated {
    /// A body known to be well-formed JSON.
    Json(Bytes),
    Raw {
        body: Bytes,
        content_type: Option<HeaderValue>,
    },
}

impl Negotiated {
    /// Classify an upstream body.
    #[must_use]
    pub fn from_upstream(headers: &HeaderMap, body: Bytes) -> Self {
        if !body.is_empty() && serde_json::from_slice::<IgnoredAny>(&body).is_ok() {
            return Self::Json(body);
        }
        Self::Raw {
            body,
            content_type: headers.get(header::CONTENT_TYPE).cloned(),
        }
    }

    /// Encode a gateway-generated payload.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(value).map(|encoded| Self::Json(Bytes::from(encoded)))
    }

    /// Build the caller-facing response. `headers` are relayed as-is apart
    /// from `content-type`, which is set from the negotiated variant.
    #[must_use]
    pub fn into_response_with(self, status: StatusCode, mut headers: HeaderMap) -> Response {
        let body = match self {
            Self::Json(body) => {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                body
            }
            Self::Raw { body, content_type } => {
                headers.remove(header::CONTENT_TYPE);
                if let Some(ct) = content_type {
                    headers.insert(header::CONTENT_TYPE, ct);
                }
                body
            }
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
