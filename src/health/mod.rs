//! Backend health aggregation and the `GET /health` endpoint.
//!
//! [`check_all`] probes every declared backend concurrently through a
//! [`HealthProber`]; each probe runs in its own task so a failure or panic
//! in one only marks that backend unavailable. [`health_handler`] renders
//! the result as [`HealthResponse`]. [`startup_self_check`] runs the same
//! probes once at boot and only logs.

pub mod probe;
pub mod retry;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

pub use probe::{HealthProber, HealthStatus};
pub use retry::RetryPolicy;

use crate::config::model::RouteEntry;
use crate::server::AppState;

pub const SERVICE_NAME: &str = "api-gateway";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"degraded"`.
    pub status: String,
    pub service: String,
    /// Route prefix to status string, in route declaration order.
    pub services: serde_json::Map<String, serde_json::Value>,
}

impl HealthResponse {
    #[must_use]
    pub fn from_statuses(statuses: &[(String, HealthStatus)]) -> Self {
        let degraded = statuses.iter().any(|(_, s)| !s.is_healthy());
        let services = statuses
            .iter()
            .map(|(prefix, status)| (prefix.clone(), serde_json::Value::String(status.to_string())))
            .collect();

        Self {
            status: if degraded { "degraded" } else { "healthy" }.to_string(),
            service: SERVICE_NAME.to_string(),
            services,
        }
    }
}

/// Probe every route's backend. Results keep the order of `routes`.
pub async fn check_all(prober: &HealthProber, routes: &[RouteEntry]) -> Vec<(String, HealthStatus)> {
    let mut set = JoinSet::new();
    for (idx, route) in routes.iter().enumerate() {
        let prober = prober.clone();
        let backend = route.backend.clone();
        set.spawn(async move { (idx, prober.probe(&backend).await) });
    }

    let mut results: Vec<Option<HealthStatus>> = vec![None; routes.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, status)) => results[idx] = Some(status),
            Err(e) => tracing::error!(error = %e, "health probe task failed"),
        }
    }

    routes
        .iter()
        .zip(results)
        .map(|(route, status)| {
            let status = status
                .unwrap_or_else(|| HealthStatus::Unavailable("health probe task failed".into()));
            (route.prefix.clone(), status)
        })
        .collect()
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let statuses = check_all(&state.prober, state.routes.entries()).await;
    let response = HealthResponse::from_statuses(&statuses);
    if response.status != "healthy" {
        tracing::warn!(
            unhealthy = statuses.iter().filter(|(_, s)| !s.is_healthy()).count(),
            total = statuses.len(),
            "gateway degraded"
        );
    }
    Json(response)
}

/// Probe all backends once and log the outcome. Never fails: backends may
/// come up in any order.
pub async fn startup_self_check(prober: HealthProber, routes: Vec<RouteEntry>) {
    let statuses = check_all(&prober, &routes).await;
    for ((prefix, status), route) in statuses.iter().zip(&routes) {
        if status.is_healthy() {
            tracing::info!(prefix = %prefix, backend = %route.backend, "backend reachable");
        } else {
            tracing::warn!(
                prefix = %prefix,
                backend = %route.backend,
                status = %status,
                "backend not ready at startup"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_healthy_is_healthy() {
        let statuses = vec![
            ("/api/users".to_string(), HealthStatus::Healthy),
            ("/api/orders".to_string(), HealthStatus::Healthy),
        ];
        let response = HealthResponse::from_statuses(&statuses);
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "api-gateway");
    }

    #[test]
    fn any_failure_is_degraded_and_order_is_kept() {
        let statuses = vec![
            ("/api/users".to_string(), HealthStatus::Healthy),
            ("/api/orders".to_string(), HealthStatus::Unhealthy(500)),
            (
                "/api/payments".to_string(),
                HealthStatus::Unavailable("connection refused".into()),
            ),
        ];
        let response = HealthResponse::from_statuses(&statuses);
        assert_eq!(response.status, "degraded");
        let keys: Vec<&String> = response.services.keys().collect();
        assert_eq!(keys, ["/api/users", "/api/orders", "/api/payments"]);
        assert_eq!(response.services["/api/orders"], "unhealthy (status: 500)");
    }
}
