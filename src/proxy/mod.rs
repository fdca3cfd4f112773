//! Core HTTP forwarding handler.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every request not claimed by a gateway endpoint. It rejects unsupported
//! methods, resolves the backend through the route table, forwards once,
//! and either relays the negotiated upstream response or records the
//! failure and answers with the fallback 503. Submodules handle header
//! construction ([`headers`]), the upstream call ([`forward`]), body
//! classification ([`negotiate`]) and the unavailable payload
//! ([`fallback`]).

pub mod fallback;
pub mod forward;
pub mod headers;
pub mod negotiate;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::server::AppState;
use forward::ProxiedRequest;
use negotiate::Negotiated;

pub const SUPPORTED_METHODS: &[Method] = &[
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
];

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    match proxy(&state, addr, method, &uri, &req_headers, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn proxy(
    state: &AppState,
    addr: SocketAddr,
    method: Method,
    uri: &Uri,
    req_headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let path = uri.path();
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    if !SUPPORTED_METHODS.contains(&method) {
        tracing::warn!(correlation_id = %correlation_id, method = %method, path = %path, "method not supported");
        return Err(ProxyError::MethodNotSupported(method.to_string()));
    }

    let Some(route) = state.routes.resolve(path) else {
        tracing::warn!(
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            "no route matched"
        );
        return Err(ProxyError::RouteNotFound);
    };

    let service = fallback::service_name_from_path(path);
    let request = ProxiedRequest::new(method.clone(), uri, req_headers, body);
    let target_url = request.target_url(&route.backend);

    tracing::info!(
        correlation_id = %correlation_id,
        client_ip = %addr.ip(),
        method = %method,
        path = %path,
        prefix = %route.prefix,
        "request received"
    );

    match forward::forward(&state.http_client, &target_url, request, state.proxy_timeout).await {
        Ok(upstream) => {
            state.failures.record_success(&route.prefix);
            tracing::info!(
                correlation_id = %correlation_id,
                target = %target_url,
                status = upstream.status.as_u16(),
                "upstream responded"
            );
            let mut headers = upstream.headers;
            headers::relay_response_headers(
                &mut headers,
                &method,
                upstream.status,
                upstream.body.is_empty(),
            );
            let negotiated = Negotiated::from_upstream(&headers, upstream.body);
            Ok(negotiated.into_response_with(upstream.status, headers))
        }
        Err(e) => {
            let message = e.to_string();
            tracing::error!(
                correlation_id = %correlation_id,
                target = %target_url,
                error = %message,
                "error proxying request"
            );
            state
                .failures
                .record_failure(&route.prefix, &route.backend, &message)
                .await;
            Err(ProxyError::UpstreamTransport {
                service: service.to_string(),
                url: target_url,
                message,
            })
        }
    }
}
