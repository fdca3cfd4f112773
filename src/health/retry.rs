//! Fixed-attempt retry policy for health probes.

use std::future::Future;
use std::time::Duration;

/// Outcome of one attempt, as judged by the caller.
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Stop and return this value.
    Done(T),
    /// Transient failure; try again if attempts remain.
    Retry(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    #[must_use]
    pub const fn no_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Run `f` until it yields [`Attempt::Done`] or the attempts run out.
    ///
    /// At least one attempt is always made. Returns the last transient
    /// error when every attempt asked for a retry.
    pub async fn run<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
        E: std::fmt::Display,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match f(attempt).await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Retry(error) => {
                    if attempt >= max {
                        return Err(error);
                    }
                    tracing::debug!(attempt, max_attempts = max, error = %error, "attempt failed, retrying");
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
    }
}
