//! Integration tests for route matching against the default table.

use platform_gateway::config::model::{Config, RouteEntry};
use platform_gateway::routes::{MatchMode, RouteTable};

fn default_table() -> RouteTable {
    RouteTable::from_config(&Config::default())
}

#[test]
fn every_default_prefix_resolves_to_its_backend() {
    let table = default_table();
    let expected = [
        ("/api/users/1", "http://localhost:8001"),
        ("/api/orders", "http://localhost:8002"),
        ("/api/payments/refunds/9", "http://localhost:8003"),
        ("/api/notifications", "http://localhost:8004"),
        ("/api/providers/a/b/c", "http://localhost:8005"),
        ("/api/repairs/7", "http://localhost:8006"),
        ("/api/child-assistance/sessions", "http://localhost:8007"),
        ("/api/moving/quotes", "http://localhost:8008"),
        ("/api/cleaning", "http://localhost:8009"),
    ];
    for (path, backend) in expected {
        let route = table
            .resolve(path)
            .unwrap_or_else(|| panic!("no route for {path}"));
        assert_eq!(route.backend, backend, "path {path}");
    }
}

#[test]
fn paths_outside_the_table_do_not_resolve() {
    let table = default_table();
    assert!(table.resolve("/").is_none());
    assert!(table.resolve("/api").is_none());
    assert!(table.resolve("/api/unknown/1").is_none());
    assert!(table.resolve("/users").is_none());
}

#[test]
fn raw_prefix_is_the_default_mode() {
    let table = default_table();
    assert_eq!(table.mode(), MatchMode::RawPrefix);
    let route = table.resolve("/api/ordersXYZ").unwrap();
    assert_eq!(route.prefix, "/api/orders");
}

#[test]
fn segment_boundary_mode_rejects_partial_segments() {
    let mut config = Config::default();
    config.routing.segment_boundary = true;
    let table = RouteTable::from_config(&config);

    assert!(table.resolve("/api/ordersXYZ").is_none());
    assert!(table.resolve("/api/orders").is_some());
    assert!(table.resolve("/api/orders/5").is_some());
}

#[test]
fn declaration_order_breaks_overlaps() {
    let entry = |prefix: &str, backend: &str| RouteEntry {
        prefix: prefix.into(),
        backend: backend.into(),
        url_env: None,
    };
    let table = RouteTable::new(
        vec![
            entry("/api/user", "http://short"),
            entry("/api/users", "http://long"),
        ],
        MatchMode::RawPrefix,
    );
    assert_eq!(table.resolve("/api/users/1").unwrap().backend, "http://short");
}

#[test]
fn env_override_changes_resolution_target() {
    let mut config = Config::default();
    config.apply_env_overrides(|name| {
        (name == "ORDER_SERVICE_URL").then(|| "http://orders.prod:9000".to_string())
    });
    let table = RouteTable::from_config(&config);
    assert_eq!(
        table.resolve("/api/orders/1").unwrap().backend,
        "http://orders.prod:9000"
    );
    assert_eq!(
        table.resolve("/api/users/1").unwrap().backend,
        "http://localhost:8001"
    );
}
