//! Shared helpers: start the gateway and stub backends on ephemeral ports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use platform_gateway::config::model::{Config, RouteEntry};
use platform_gateway::server::{self, AppState};

pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn route(prefix: &str, backend: &str) -> RouteEntry {
    RouteEntry {
        prefix: prefix.into(),
        backend: backend.into(),
        url_env: None,
    }
}

pub fn config_with(routes: Vec<RouteEntry>) -> Config {
    let mut config = Config {
        routes,
        ..Config::default()
    };
    config.health.timeout_ms = 500;
    config
}

pub async fn start_gateway(config: Config) -> TestGateway {
    let state = Arc::new(AppState::from_config(&config, server::build_http_client()));
    let router = server::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    TestGateway {
        addr,
        state,
        shutdown: Some(shutdown_tx),
    }
}

/// Serve `router` as a backend and return its base URL.
pub async fn start_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
