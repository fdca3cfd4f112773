//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production) or pretty-printed output (for TTY / local dev). Format
//! is auto-detected from the terminal but can be forced via `--json`
//! or `--pretty`. Connection-pool chatter from the HTTP client crates is
//! capped at `warn`. With `sentry-integration`, events are also forwarded
//! to Sentry. Failed proxied calls are alerted through
//! [`AlertNotifier`](crate::failure::AlertNotifier) alone, so their log
//! events reach Sentry as breadcrumbs only.

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[must_use]
pub fn filter(level: &LogLevel) -> Targets {
    let tracing_level = level.to_tracing_level();
    let client_level = if tracing_level > Level::WARN {
        Level::WARN
    } else {
        tracing_level
    };
    Targets::new()
        .with_default(tracing_level)
        .with_target("hyper_util", client_level)
        .with_target("rustls", client_level)
}

/// Targets whose `error` events are already reported by the alert notifier.
const ALERTED_TARGETS: &[&str] = &["platform_gateway::proxy", "platform_gateway::failure"];

#[cfg_attr(not(feature = "sentry-integration"), allow(dead_code))]
fn is_alerted_target(target: &str) -> bool {
    ALERTED_TARGETS.iter().any(|t| target.starts_with(t))
}

#[cfg(feature = "sentry-integration")]
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    if is_alerted_target(metadata.target()) {
        sentry_tracing::EventFilter::Breadcrumb
    } else {
        sentry_tracing::default_event_filter(metadata)
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(level));

    #[cfg(feature = "sentry-integration")]
    let registry = registry.with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty()).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_wins() {
        assert_eq!(resolve_format(false, true), LogFormat::Json);
        assert_eq!(resolve_format(true, false), LogFormat::Pretty);
    }

    #[test]
    fn client_crates_are_capped_at_warn() {
        use tracing_subscriber::filter::LevelFilter;

        let targets = filter(&LogLevel::Debug);
        let levels: Vec<_> = targets.iter().collect();
        assert!(levels.contains(&("hyper_util", LevelFilter::WARN)));

        let targets = filter(&LogLevel::Error);
        let levels: Vec<_> = targets.iter().collect();
        assert!(levels.contains(&("hyper_util", LevelFilter::ERROR)));
    }

    #[test]
    fn request_path_errors_are_left_to_the_notifier() {
        assert!(is_alerted_target("platform_gateway::proxy"));
        assert!(is_alerted_target("platform_gateway::proxy::forward"));
        assert!(is_alerted_target("platform_gateway::failure"));
        assert!(!is_alerted_target("platform_gateway::cmd::run"));
        assert!(!is_alerted_target("platform_gateway::server"));
    }
}
