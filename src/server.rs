//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the route table,
//! HTTP client, health prober and failure tracker), [`build_router`] for
//! constructing the Axum router with middleware layers,
//! [`build_http_client`] for the connection-pooled hyper client, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{any, get};
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::model::Config;
use crate::docs::{api_docs_handler, root_handler};
use crate::failure::{AlertNotifier, FailureTracker, NoopNotifier};
use crate::health::{health_handler, HealthProber, RetryPolicy};
use crate::proxy;
use crate::proxy::fallback::fallback_handler;
use crate::routes::RouteTable;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub routes: RouteTable,
    pub http_client: HttpClient,
    pub prober: HealthProber,
    pub failures: FailureTracker,
    pub proxy_timeout: Duration,
    pub max_body: usize,
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn from_config(config: &Config, http_client: HttpClient) -> Self {
        Self::with_notifier(config, http_client, Arc::new(NoopNotifier))
    }

    #[must_use]
    pub fn with_notifier(
        config: &Config,
        http_client: HttpClient,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        let policy = RetryPolicy::new(
            config.health.retries,
            Duration::from_millis(config.health.backoff_ms),
        );
        let prober = HealthProber::new(
            http_client.clone(),
            policy,
            Duration::from_millis(config.health.timeout_ms),
        );

        Self {
            routes: RouteTable::from_config(config),
            http_client,
            prober,
            failures: FailureTracker::with_notifier(config.failures.threshold, notifier),
            proxy_timeout: Duration::from_secs(config.proxy.timeout_secs),
            max_body: config.proxy.max_body,
            start_time: Instant::now(),
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body = state.max_body;
    Router::new()
        // Other methods on gateway endpoints go through the proxy like any path.
        .route("/", get(root_handler).fallback(proxy::forward_handler))
        .route("/health", get(health_handler).fallback(proxy::forward_handler))
        .route(
            "/api-docs",
            get(api_docs_handler).fallback(proxy::forward_handler),
        )
        .route("/fallback/{service_name}", any(fallback_handler))
        .fallback(proxy::forward_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
