//! `GET /` and `GET /api-docs`: static gateway information and the
//! service directory derived from the route table.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routes::RouteTable;
use crate::server::AppState;

pub const API_NAME: &str = "Service Platform API";

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub documentation: String,
    pub healthcheck: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub url: String,
    pub health: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Endpoints {
    pub root: String,
    pub health: String,
    pub api_docs: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiDocsResponse {
    pub api_name: String,
    pub version: String,
    pub services: Vec<ServiceInfo>,
    pub endpoints: Endpoints,
}

impl ApiDocsResponse {
    #[must_use]
    pub fn for_routes(routes: &RouteTable) -> Self {
        let services = routes
            .entries()
            .iter()
            .map(|route| ServiceInfo {
                name: route
                    .prefix
                    .strip_prefix("/api/")
                    .unwrap_or(&route.prefix)
                    .to_string(),
                url: route.prefix.clone(),
                health: format!("{}/health", route.prefix),
            })
            .collect();

        Self {
            api_name: API_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services,
            endpoints: Endpoints {
                root: "/".into(),
                health: "/health".into(),
                api_docs: "/api-docs".into(),
            },
        }
    }
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Service Platform API Gateway".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        documentation: "/api-docs".into(),
        healthcheck: "/health".into(),
    })
}

pub async fn api_docs_handler(State(state): State<Arc<AppState>>) -> Json<ApiDocsResponse> {
    Json(ApiDocsResponse::for_routes(&state.routes))
}
