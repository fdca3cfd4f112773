//! Header handling for forwarded requests and relayed responses.
//!
//! [`build_forwarded_headers`] copies the caller's headers minus `Host`
//! (the client sets it from the target URL), hop-by-hop headers, and
//! `content-length` (recomputed from the forwarded body).
//! [`relay_response_headers`] does the same cleanup on relayed responses,
//! keeping the upstream `content-length` where the body is absent by
//! definition (HEAD, 304).

use std::sync::LazyLock;

use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Strip hop-by-hop headers and `content-length`.
///
/// Bodies are fully buffered in both directions, so framing headers from
/// the other side are no longer accurate; hyper and axum set
/// `content-length` from the actual bytes.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(header::CONTENT_LENGTH);
}

#[must_use]
pub fn build_forwarded_headers(original: &HeaderMap) -> HeaderMap {
    let mut headers = original.clone();
    headers.remove(header::HOST);
    strip_hop_by_hop(&mut headers);
    headers
}

/// Clean upstream response headers for relaying to the caller.
///
/// A HEAD or 304 response describes a representation it does not carry;
/// its `content-length` is kept rather than recomputed from the empty body.
pub fn relay_response_headers(
    headers: &mut HeaderMap,
    method: &Method,
    status: StatusCode,
    body_is_empty: bool,
) {
    let declared = headers.get(header::CONTENT_LENGTH).cloned();
    strip_hop_by_hop(headers);

    let bodiless = *method == Method::HEAD || status == StatusCode::NOT_MODIFIED;
    if let Some(length) = declared.filter(|_| bodiless && body_is_empty) {
        headers.insert(header::CONTENT_LENGTH, length);
    }
}
