//! Retry with exponential backoff and jitter, shared by the Fetcher and
//! Uploader for transport-level failures against the remote store.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Base delay before the first retry.
const BASE_DELAY: Duration = Duration::from_secs(2);
/// Delay never exceeds this, however many attempts have elapsed.
const MAX_DELAY: Duration = Duration::from_secs(30);
/// Retries attempted after the initial try.
const MAX_RETRIES: u32 = 3;
/// Uniform jitter applied to each computed delay, as a fraction of it.
const JITTER_FRACTION: f64 = 0.25;

/// Retry configuration. The defaults match the Fetcher/Uploader transport
/// retry contract; `operation_name` only affects log lines.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
            operation_name: "remote_storage_operation".to_string(),
        }
    }
}

impl RetryConfig {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32, jitter_seed: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1).min(16)));
        let capped = delay.min(self.max_delay);

        // Deterministic, cheap jitter derived from the attempt/seed rather
        // than a dependency on `rand`: +/-25% spread is all the contract
        // requires, not cryptographic unpredictability.
        let spread = ((jitter_seed % 1000) as f64 / 1000.0) * 2.0 - 1.0; // [-1.0, 1.0)
        let factor = 1.0 + spread * JITTER_FRACTION;
        capped.mul_f64(factor.max(0.0))
    }
}

/// Run `operation`, retrying on `Err` up to `config.max_retries` times with
/// backoff. `jitter_seed` should vary per call site (e.g. derived from the
/// job id) so concurrent retries don't all wake up in lockstep.
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    jitter_seed: u32,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries => {
                attempt += 1;
                let delay = config.delay_for_attempt(attempt, jitter_seed.wrapping_add(attempt));
                debug!(
                    "{} attempt {} failed, retrying in {:?}: {}",
                    config.operation_name, attempt, delay, e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(
                    "{} failed after {} attempts: {}",
                    config.operation_name,
                    attempt + 1,
                    e
                );
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delay_doubles_and_caps() {
        let config = RetryConfig::default();
        let first = config.delay_for_attempt(1, 500);
        let second = config.delay_for_attempt(2, 500);
        assert!(second > first);
        assert!(config.delay_for_attempt(10, 500) <= MAX_DELAY);
    }

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let config = RetryConfig::new("test");
        let calls = AtomicU32::new(0);
        let result = retry_async(&config, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(7) }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_exhausted_then_returns_err() {
        let mut config = RetryConfig::new("test");
        config.base_delay = Duration::from_millis(1);
        config.max_retries = 2;
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_async(&config, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("transient") }
        })
        .await;
        assert_eq!(result, Err("transient"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
