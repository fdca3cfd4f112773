//! Integration tests for the gateway's own endpoints and graceful shutdown.

mod common;

use common::{config_with, dead_backend, route, start_gateway};
use platform_gateway::config::model::Config;
use platform_gateway::docs::{ApiDocsResponse, RootResponse};
use serde_json::Value;

#[tokio::test]
async fn root_describes_the_gateway() {
    let gw = start_gateway(Config::default()).await;

    let resp = reqwest::get(gw.url("/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: RootResponse = resp.json().await.unwrap();
    assert_eq!(body.message, "Service Platform API Gateway");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(body.documentation, "/api-docs");
    assert_eq!(body.healthcheck, "/health");

    gw.shutdown();
}

#[tokio::test]
async fn api_docs_lists_services_in_route_order() {
    let gw = start_gateway(Config::default()).await;

    let resp = reqwest::get(gw.url("/api-docs")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let docs: ApiDocsResponse = resp.json().await.unwrap();
    assert_eq!(docs.api_name, "Service Platform API");
    let names: Vec<&str> = docs.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "users",
            "orders",
            "payments",
            "notifications",
            "providers",
            "repairs",
            "child-assistance",
            "moving",
            "cleaning"
        ]
    );
    assert_eq!(docs.services[0].health, "/api/users/health");
    assert_eq!(docs.endpoints.health, "/health");

    gw.shutdown();
}

#[tokio::test]
async fn fallback_endpoint_names_the_service() {
    let gw = start_gateway(Config::default()).await;
    let client = reqwest::Client::new();

    for method in [reqwest::Method::GET, reqwest::Method::POST] {
        let resp = client
            .request(method, gw.url("/fallback/payments"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 503);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Service Unavailable");
        assert_eq!(
            body["message"],
            "The payments service is currently unavailable."
        );
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
    }

    gw.shutdown();
}

#[tokio::test]
async fn post_to_gateway_endpoint_falls_through_to_proxy() {
    let gw = start_gateway(Config::default()).await;

    let resp = reqwest::Client::new()
        .post(gw.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Not Found");

    gw.shutdown();
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = Config::default();
    config.proxy.max_body = 16;
    let gw = start_gateway(config).await;

    let resp = reqwest::Client::new()
        .post(gw.url("/api/orders"))
        .body(vec![b'x'; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);

    gw.shutdown();
}

#[tokio::test]
async fn graceful_shutdown_stops_accepting() {
    let backend = dead_backend().await;
    let gw = start_gateway(config_with(vec![route("/api/orders", &backend)])).await;
    let url = gw.url("/");

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    gw.shutdown();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    assert!(client.get(&url).send().await.is_err());
}
