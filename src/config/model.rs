//! Serde data structures for the gateway configuration file.
//!
//! Contains [`Config`] (the root), [`RouteEntry`], and the tuning sections
//! [`Routing`], [`ProxySettings`], [`HealthSettings`] and
//! [`FailureSettings`]. All types derive `Serialize` and `Deserialize`
//! with `deny_unknown_fields` for strict parsing. Every section is
//! optional; an empty file yields the built-in route table.

use serde::{Deserialize, Serialize};

/// Built-in route table: prefix, override variable, default backend.
pub const DEFAULT_ROUTES: &[(&str, &str, &str)] = &[
    ("/api/users", "USER_SERVICE_URL", "http://localhost:8001"),
    ("/api/orders", "ORDER_SERVICE_URL", "http://localhost:8002"),
    ("/api/payments", "PAYMENT_SERVICE_URL", "http://localhost:8003"),
    (
        "/api/notifications",
        "NOTIFICATION_SERVICE_URL",
        "http://localhost:8004",
    ),
    ("/api/providers", "PROVIDER_SERVICE_URL", "http://localhost:8005"),
    ("/api/repairs", "REPAIR_SERVICE_URL", "http://localhost:8006"),
    (
        "/api/child-assistance",
        "CHILD_ASSISTANCE_SERVICE_URL",
        "http://localhost:8007",
    ),
    ("/api/moving", "MOVING_SERVICE_URL", "http://localhost:8008"),
    ("/api/cleaning", "CLEANING_SERVICE_URL", "http://localhost:8009"),
];

const fn default_proxy_timeout() -> u64 {
    30
}

const fn default_max_body() -> usize {
    1_048_576
}

const fn default_health_retries() -> u32 {
    3
}

const fn default_health_timeout() -> u64 {
    2000
}

const fn default_startup_retries() -> u32 {
    1
}

const fn default_threshold() -> u32 {
    3
}

fn default_routes() -> Vec<RouteEntry> {
    DEFAULT_ROUTES
        .iter()
        .map(|(prefix, env, url)| RouteEntry {
            prefix: (*prefix).to_string(),
            backend: (*url).to_string(),
            url_env: Some((*env).to_string()),
        })
        .collect()
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub routing: Routing,

    #[serde(default)]
    pub proxy: ProxySettings,

    #[serde(default)]
    pub health: HealthSettings,

    #[serde(default)]
    pub failures: FailureSettings,

    #[serde(default = "default_routes")]
    pub routes: Vec<RouteEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing: Routing::default(),
            proxy: ProxySettings::default(),
            health: HealthSettings::default(),
            failures: FailureSettings::default(),
            routes: default_routes(),
        }
    }
}

impl Config {
    /// Replace each route's backend with the value of its `url_env`
    /// variable, when `lookup` yields a non-empty one.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for route in &mut self.routes {
            let Some(ref var) = route.url_env else {
                continue;
            };
            if let Some(url) = lookup(var).filter(|v| !v.trim().is_empty()) {
                tracing::debug!(prefix = %route.prefix, env = %var, "backend overridden from environment");
                route.backend = url.trim().to_string();
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Routing {
    /// Require a match to end on a `/` boundary instead of raw `startswith`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub segment_boundary: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySettings {
    #[serde(default = "default_proxy_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_body")]
    pub max_body: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_proxy_timeout(),
            max_body: default_max_body(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthSettings {
    /// Attempts per backend for the aggregate `/health` endpoint.
    #[serde(default = "default_health_retries")]
    pub retries: u32,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_health_timeout")]
    pub timeout_ms: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub backoff_ms: u64,

    /// Attempts per backend for the startup self-check.
    #[serde(default = "default_startup_retries")]
    pub startup_retries: u32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            retries: default_health_retries(),
            timeout_ms: default_health_timeout(),
            backoff_ms: 0,
            startup_retries: default_startup_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FailureSettings {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

impl Default for FailureSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    pub prefix: String,

    pub backend: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_backends_in_order() {
        let config = Config::default();
        let prefixes: Vec<&str> = config.routes.iter().map(|r| r.prefix.as_str()).collect();
        assert_eq!(prefixes.len(), 9);
        assert_eq!(prefixes[0], "/api/users");
        assert_eq!(prefixes[8], "/api/cleaning");
        assert_eq!(config.proxy.timeout_secs, 30);
        assert_eq!(config.health.retries, 3);
        assert_eq!(config.health.startup_retries, 1);
        assert_eq!(config.failures.threshold, 3);
    }

    #[test]
    fn env_override_replaces_backend() {
        let mut config = Config::default();
        config.apply_env_overrides(|var| {
            (var == "ORDER_SERVICE_URL").then(|| "http://orders:9".to_string())
        });
        let orders = config
            .routes
            .iter()
            .find(|r| r.prefix == "/api/orders")
            .unwrap();
        assert_eq!(orders.backend, "http://orders:9");
        assert_eq!(config.routes[0].backend, "http://localhost:8001");
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.routes[1].backend, "http://localhost:8002");
    }

    #[test]
    fn route_without_env_is_untouched() {
        let mut config = Config {
            routes: vec![RouteEntry {
                prefix: "/api/orders".into(),
                backend: "http://orders:9".into(),
                url_env: None,
            }],
            ..Config::default()
        };
        config.apply_env_overrides(|_| Some("http://elsewhere:1".to_string()));
        assert_eq!(config.routes[0].backend, "http://orders:9");
    }
}
