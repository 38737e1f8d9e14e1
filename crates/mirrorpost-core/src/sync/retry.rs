//! Bounded retry with a fixed delay between attempts.

use std::future::Future;
use std::time::Duration;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// How a retried operation ended.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, DomainError>,
    pub attempts: u32,
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only transient errors are retried.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Attempted<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match op().await {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(err) if err.is_transient() && attempts < max_attempts => {
                    tracing::warn!(
                        operation = %label,
                        attempt = attempts,
                        max_attempts,
                        error = %err,
                        "Transient failure, will retry"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => {
                    return Attempted {
                        result: Err(err),
                        attempts,
                    };
                }
            }
        }
    }
}
