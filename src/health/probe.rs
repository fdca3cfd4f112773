//! Bounded-retry liveness probe against a backend's `/health` endpoint.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;

use super::retry::{Attempt, RetryPolicy};
use crate::error::error_chain;
use crate::server::HttpClient;

/// Result of probing one backend. Computed fresh on every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Reachable, answered with a non-200 status.
    Unhealthy(u16),
    /// Transport failure on every attempt; holds the last error.
    Unavailable(String),
}

impl HealthStatus {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Unhealthy(code) => write!(f, "unhealthy (status: {code})"),
            Self::Unavailable(error) => write!(f, "unavailable ({error})"),
        }
    }
}

#[derive(Clone)]
pub struct HealthProber {
    client: HttpClient,
    policy: RetryPolicy,
    timeout: Duration,
}

impl HealthProber {
    #[must_use]
    pub const fn new(client: HttpClient, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
        }
    }

    /// Same client and timeout with a different retry policy.
    #[must_use]
    pub fn with_policy(&self, policy: RetryPolicy) -> Self {
        Self {
            client: self.client.clone(),
            policy,
            timeout: self.timeout,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Probe `{backend}/health`.
    ///
    /// Any HTTP answer is authoritative and ends probing; only transport
    /// errors and timeouts are retried.
    pub async fn probe(&self, backend: &str) -> HealthStatus {
        let url = format!("{}/health", backend.trim_end_matches('/'));
        let uri: hyper::Uri = match url.parse() {
            Ok(u) => u,
            Err(e) => return HealthStatus::Unavailable(format!("invalid URL '{url}': {e}")),
        };

        let outcome = self
            .policy
            .run(|attempt| {
                let uri = uri.clone();
                async move {
                    let req = match hyper::Request::get(uri).body(Full::new(Bytes::new())) {
                        Ok(r) => r,
                        Err(e) => return Attempt::Done(HealthStatus::Unavailable(e.to_string())),
                    };

                    match tokio::time::timeout(self.timeout, self.client.request(req)).await {
                        Ok(Ok(response)) => {
                            let status = response.status();
                            tracing::debug!(backend = %backend, attempt, status = status.as_u16(), "health probe answered");
                            if status == StatusCode::OK {
                                Attempt::Done(HealthStatus::Healthy)
                            } else {
                                Attempt::Done(HealthStatus::Unhealthy(status.as_u16()))
                            }
                        }
                        Ok(Err(e)) => Attempt::Retry(error_chain(&e)),
                        Err(_) => Attempt::Retry(format!(
                            "timed out after {}ms",
                            self.timeout.as_millis()
                        )),
                    }
                }
            })
            .await;

        outcome.unwrap_or_else(HealthStatus::Unavailable)
    }
}
