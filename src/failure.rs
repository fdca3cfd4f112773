//! Consecutive proxy failure tracking per route.
//!
//! [`FailureTracker`] counts transport failures per route prefix, so every
//! request that reaches one backend shares a counter. Every
//! failure logs at critical severity and is handed to the configured
//! [`AlertNotifier`]. When the count reaches the threshold a warning is
//! logged and the counter resets, so the threshold limits log volume and
//! never stops requests from being dispatched. A successful call resets
//! the counter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

/// Details of a single failed proxied call.
#[derive(Debug, Clone)]
pub struct CriticalAlert {
    /// Route prefix of the failed call, e.g. `/api/orders`.
    pub prefix: String,
    pub backend: String,
    pub error: String,
}

// async_trait is required because the notifier is held as Arc<dyn AlertNotifier>.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &CriticalAlert);
}

/// Default notifier. Delivery channels (mail, chat) plug in here.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl AlertNotifier for NoopNotifier {
    async fn notify(&self, _alert: &CriticalAlert) {}
}

pub struct FailureTracker {
    threshold: u32,
    counters: Mutex<HashMap<String, u32>>,
    notifier: Arc<dyn AlertNotifier>,
}

impl std::fmt::Debug for FailureTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureTracker")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl FailureTracker {
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self::with_notifier(threshold, Arc::new(NoopNotifier))
    }

    #[must_use]
    pub fn with_notifier(threshold: u32, notifier: Arc<dyn AlertNotifier>) -> Self {
        Self {
            threshold: threshold.max(1),
            counters: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record a failed call on the route `prefix`. Returns `true` when this
    /// failure reached the threshold (and the counter was reset).
    pub async fn record_failure(&self, prefix: &str, backend: &str, error: &str) -> bool {
        let (count, reached) = self.bump(prefix);

        tracing::error!(
            severity = "critical",
            prefix = %prefix,
            backend = %backend,
            error = %error,
            consecutive_failures = count,
            "critical: backend call failed"
        );

        if reached {
            tracing::warn!(
                prefix = %prefix,
                backend = %backend,
                error = %error,
                threshold = self.threshold,
                "route {prefix} failed {} consecutive times",
                self.threshold
            );
        }

        let alert = CriticalAlert {
            prefix: prefix.to_string(),
            backend: backend.to_string(),
            error: error.to_string(),
        };
        self.notifier.notify(&alert).await;

        reached
    }

    pub fn record_success(&self, prefix: &str) {
        let mut counters = self.lock();
        if let Some(count) = counters.get_mut(prefix) {
            *count = 0;
        }
    }

    #[must_use]
    pub fn count(&self, prefix: &str) -> u32 {
        self.lock().get(prefix).copied().unwrap_or(0)
    }

    fn bump(&self, prefix: &str) -> (u32, bool) {
        let mut counters = self.lock();
        let count = counters.entry(prefix.to_string()).or_insert(0);
        *count += 1;
        let seen = *count;
        if seen >= self.threshold {
            *count = 0;
            (seen, true)
        } else {
            (seen, false)
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u32>> {
        // Counters are advisory; a poisoned map is still usable.
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
