//! `platform-gateway health`: check the health of a running gateway.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the per-service report as formatted text or raw JSON.

use std::time::Duration;

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::GatewayError;
use crate::health::HealthResponse;

pub async fn execute(args: HealthArgs) -> Result<(), GatewayError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse()
            .map_err(|e: hyper::http::uri::InvalidUri| GatewayError::UriParse {
                source: Box::new(e),
            })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;

    // The gateway probes every backend with retries before answering.
    let response = tokio::time::timeout(Duration::from_secs(30), client.request(req))
        .await
        .map_err(|_| GatewayError::HttpRequest {
            source: "health check timed out after 30s".into(),
        })?
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(GatewayError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => {
            print!("{}", format_report(&args.url, &health));
            if args.strict && health.status != "healthy" {
                return Err(GatewayError::HealthCheckFailed(
                    hyper::StatusCode::SERVICE_UNAVAILABLE,
                ));
            }
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

#[must_use]
pub fn format_report(url: &str, health: &HealthResponse) -> String {
    use std::fmt::Write;

    let mark = if health.status == "healthy" {
        '\u{2713}'
    } else {
        '\u{2717}'
    };
    let mut out = format!("{mark} {} is {} ({url})\n", health.service, health.status);
    let width = health.services.keys().map(String::len).max().unwrap_or(0);
    for (prefix, status) in &health.services {
        let status = status.as_str().unwrap_or("unknown");
        // write! to String is infallible
        let _ = writeln!(out, "  {prefix:<width$}  {status}");
    }
    out
}
