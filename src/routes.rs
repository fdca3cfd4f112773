//! Prefix-based service resolution.
//!
//! [`RouteTable::resolve`] walks the declared routes in order and returns
//! the first entry whose prefix matches the request path. By default the
//! comparison is a raw string prefix test, so `/api/ordersXYZ` matches
//! `/api/orders`; [`MatchMode::SegmentBoundary`] additionally requires the
//! prefix to end on a `/` boundary.

use crate::config::model::{Config, RouteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `path.starts_with(prefix)`.
    RawPrefix,
    /// The prefix must be followed by `/`, `?` or the end of the path.
    SegmentBoundary,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    mode: MatchMode,
}

impl RouteTable {
    #[must_use]
    pub const fn new(entries: Vec<RouteEntry>, mode: MatchMode) -> Self {
        Self { entries, mode }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mode = if config.routing.segment_boundary {
            MatchMode::SegmentBoundary
        } else {
            MatchMode::RawPrefix
        };
        Self::new(config.routes.clone(), mode)
    }

    /// First entry, in declaration order, whose prefix matches `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|entry| self.matches(&entry.prefix, path))
    }

    fn matches(&self, prefix: &str, path: &str) -> bool {
        let Some(rest) = path.strip_prefix(prefix) else {
            return false;
        };
        match self.mode {
            MatchMode::RawPrefix => true,
            MatchMode::SegmentBoundary => {
                prefix.ends_with('/') || rest.is_empty() || rest.starts_with(['/', '?'])
            }
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prefix: &str, backend: &str) -> RouteEntry {
        RouteEntry {
            prefix: prefix.into(),
            backend: backend.into(),
            url_env: None,
        }
    }

    fn table(mode: MatchMode) -> RouteTable {
        RouteTable::new(
            vec![
                entry("/api/users", "http://users:1"),
                entry("/api/orders", "http://orders:2"),
            ],
            mode,
        )
    }

    #[test]
    fn resolves_declared_prefix() {
        let t = table(MatchMode::RawPrefix);
        assert_eq!(t.resolve("/api/orders/5").unwrap().backend, "http://orders:2");
        assert_eq!(t.resolve("/api/users").unwrap().backend, "http://users:1");
    }

    #[test]
    fn no_match_is_none() {
        let t = table(MatchMode::RawPrefix);
        assert!(t.resolve("/api/unknown").is_none());
        assert!(t.resolve("/").is_none());
        assert!(t.resolve("/orders").is_none());
    }

    #[test]
    fn first_declared_match_wins() {
        let t = RouteTable::new(
            vec![
                entry("/api/order", "http://first:1"),
                entry("/api/orders", "http://second:2"),
            ],
            MatchMode::RawPrefix,
        );
        assert_eq!(t.resolve("/api/orders/5").unwrap().backend, "http://first:1");
    }

    #[test]
    fn raw_prefix_matches_across_segment() {
        let t = table(MatchMode::RawPrefix);
        assert_eq!(t.resolve("/api/ordersXYZ").unwrap().backend, "http://orders:2");
    }

    #[test]
    fn segment_boundary_rejects_partial_segment() {
        let t = table(MatchMode::SegmentBoundary);
        assert!(t.resolve("/api/ordersXYZ").is_none());
        assert!(t.resolve("/api/orders").is_some());
        assert!(t.resolve("/api/orders/v1/5").is_some());
    }

    #[test]
    fn from_config_reads_mode() {
        let mut config = Config::default();
        assert_eq!(RouteTable::from_config(&config).mode(), MatchMode::RawPrefix);
        config.routing.segment_boundary = true;
        let t = RouteTable::from_config(&config);
        assert_eq!(t.mode(), MatchMode::SegmentBoundary);
        assert_eq!(t.len(), 9);
    }
}
