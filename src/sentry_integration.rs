//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN and environment, and
//! provides [`SentryNotifier`], which reports every failed proxied call
//! as a Sentry event. The guard returned by [`init`] must be held for the
//! lifetime of the application.

use async_trait::async_trait;

use crate::failure::{AlertNotifier, CriticalAlert};

pub fn init(dsn: &str, environment: Option<&str>) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: environment.map(|e| e.to_string().into()),
        release: Some(env!("CARGO_PKG_VERSION").into()),
        ..Default::default()
    })
}

#[derive(Debug, Default)]
pub struct SentryNotifier;

#[async_trait]
impl AlertNotifier for SentryNotifier {
    async fn notify(&self, alert: &CriticalAlert) {
        sentry::with_scope(
            |scope| {
                scope.set_tag("prefix", &alert.prefix);
                scope.set_extra("backend", alert.backend.clone().into());
            },
            || {
                sentry::capture_message(
                    &format!("call to {} failed: {}", alert.prefix, alert.error),
                    sentry::Level::Error,
                )
            },
        );
    }
}
