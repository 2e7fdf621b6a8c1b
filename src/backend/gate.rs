//! Call cadence for the backend.
//!
//! A semaphore bounds in-flight calls and consecutive call starts are spaced
//! by a fixed interval, whatever the number of concurrent callers.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, Instant};
use tracing::warn;

use super::{CompletionBackend, CompletionRequest, RetryConfig};
use crate::error::Result;
use crate::types::DocGenConfig;

/// Limits concurrency and spaces call starts.
pub struct RateGate {
    permits: Semaphore,
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(max_in_flight: usize, min_interval: Duration) -> Self {
        Self {
            permits: Semaphore::new(max_in_flight.max(1)),
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// Run `f` once a permit is free and the interval since the previous
    /// start has elapsed.
    pub async fn run<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // the semaphore is never closed
        let _permit = self.permits.acquire().await.ok();
        self.wait_turn().await;
        f().await
    }

    async fn wait_turn(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Backend wrapper applying the rate gate and bounded retry.
pub struct GatedBackend<B> {
    inner: B,
    gate: RateGate,
    retry: RetryConfig,
}

impl<B: CompletionBackend> GatedBackend<B> {
    pub fn new(inner: B, gate: RateGate, retry: RetryConfig) -> Self {
        Self { inner, gate, retry }
    }

    /// Wrap a backend with the cadence and retry settings of a run.
    pub fn from_config(inner: B, config: &DocGenConfig) -> Self {
        Self::new(
            inner,
            RateGate::new(config.map_concurrency, config.call_delay()),
            RetryConfig::with_retries(config.max_retries),
        )
    }
}

#[async_trait]
impl<B: CompletionBackend> CompletionBackend for GatedBackend<B> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut attempt = 0;
        loop {
            let result = self.gate.run(|| self.inner.complete(request)).await;
            match result {
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transient backend error, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::backend::testing::ScriptedBackend;
    use crate::error::DocError;

    #[tokio::test]
    async fn test_gate_spaces_calls() {
        let gate = RateGate::new(1, Duration::from_millis(30));
        let start = Instant::now();
        for _ in 0..3 {
            gate.run(|| async {}).await;
        }
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let backend = ScriptedBackend::new(|_| {
            Err(DocError::Backend {
                status: 500,
                body: "boom".to_string(),
            })
        });
        let gated = GatedBackend::new(
            Arc::new(backend),
            RateGate::new(1, Duration::ZERO),
            RetryConfig::default(),
        );

        let err = gated
            .complete(&CompletionRequest::new("m", "s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocError::Backend { status: 500, .. }));
        assert_eq!(gated.inner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let backend = ScriptedBackend::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DocError::Backend {
                    status: 503,
                    body: String::new(),
                })
            } else {
                Ok("done".to_string())
            }
        });
        let retry = RetryConfig {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            ..Default::default()
        };
        let gated = GatedBackend::new(backend, RateGate::new(1, Duration::ZERO), retry);

        let text = gated
            .complete(&CompletionRequest::new("m", "s", "u"))
            .await
            .unwrap();
        assert_eq!(text, "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let backend = ScriptedBackend::new(|_| {
            Err(DocError::Backend {
                status: 401,
                body: "bad key".to_string(),
            })
        });
        let gated = GatedBackend::new(
            backend,
            RateGate::new(1, Duration::ZERO),
            RetryConfig::with_retries(3),
        );

        assert!(gated.complete(&CompletionRequest::new("m", "s", "u")).await.is_err());
        assert_eq!(gated.inner.calls().len(), 1);
    }
}
