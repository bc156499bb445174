//! Retry with linear back-off for marketplace requests.
//!
//! Only [`ErrorClass::Retryable`] errors are retried: 429 responses and
//! connect/timeout failures. Every other error is returned on first sight.

use std::future::Future;
use std::time::Duration;

use crate::error::{ErrorClass, MarketError};

/// Runs `operation` up to `max_attempts` times in total.
///
/// The wait before attempt `n + 1` is `retry_delay_ms * n`, so with the
/// default 1 000 ms the schedule is 1 s, 2 s, ... The last retryable error is
/// returned once the budget is spent.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    retry_delay_ms: u64,
    mut operation: F,
) -> Result<T, MarketError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if err.class() != ErrorClass::Retryable || attempt >= max_attempts {
                    return Err(err);
                }
                let delay_ms = retry_delay_ms.saturating_mul(u64::from(attempt));
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "marketplace transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api_err(status: u16) -> MarketError {
        MarketError::Api {
            status,
            message: "boom".to_owned(),
            url: "http://test/".to_owned(),
        }
    }

    fn rate_limited() -> MarketError {
        MarketError::RateLimited {
            url: "http://test/".to_owned(),
        }
    }

    #[test]
    fn rate_limit_is_retryable() {
        assert_eq!(rate_limited().class(), ErrorClass::Retryable);
    }

    #[test]
    fn server_error_is_fatal() {
        assert_eq!(api_err(500).class(), ErrorClass::Fatal);
        assert_eq!(api_err(400).class(), ErrorClass::Fatal);
    }

    #[test]
    fn deserialize_error_is_partial_data() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        let err = MarketError::Deserialize {
            context: "test".to_owned(),
            source,
        };
        assert_eq!(err.class(), ErrorClass::PartialData);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, MarketError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(rate_limited())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;
        assert!(matches!(result, Err(MarketError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "3 attempts in total");
    }

    #[tokio::test(start_paused = true)]
    async fn back_off_grows_linearly_with_attempt() {
        let started = tokio::time::Instant::now();
        let waits = Arc::new(std::sync::Mutex::new(Vec::new()));
        let w = Arc::clone(&waits);
        let result = retry_with_backoff(4, 100, || {
            let w = Arc::clone(&w);
            async move {
                w.lock().unwrap().push(started.elapsed());
                Err::<u32, _>(rate_limited())
            }
        })
        .await;

        assert!(result.is_err());
        let waits = waits.lock().unwrap();
        // Attempts start at 0, 100, 100+200 and 100+200+300 ms.
        assert_eq!(
            *waits,
            [
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(600),
            ]
        );
        assert_eq!(started.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test]
    async fn does_not_retry_api_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api_err(500))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "500 must not be retried");
        assert!(matches!(result, Err(MarketError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn zero_budget_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let _ = retry_with_backoff(0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
