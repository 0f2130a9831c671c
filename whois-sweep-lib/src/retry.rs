//! Bounded retry for single ad-hoc lookups.
//!
//! The batch path never retries; pacing and windows are its backpressure.
//! Single lookups can afford to wait, so they wrap the same WHOIS exchange in
//! [`with_retry`].

use crate::error::DomainCheckError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Run `op` up to `max_attempts` times, sleeping `delay` between attempts.
///
/// Only retryable errors (see [`DomainCheckError::is_retryable`]) trigger
/// another attempt; anything else is returned immediately. A `max_attempts`
/// of 0 is treated as 1.
pub async fn with_retry<T, F, Fut>(
    mut op: F,
    max_attempts: u32,
    delay: Duration,
) -> Result<T, DomainCheckError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainCheckError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                debug!(attempt, max_attempts, error = %e, "attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn refused() -> DomainCheckError {
        DomainCheckError::connection("whois.example", "connection refused")
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, DomainCheckError>("response")
            },
            3,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(assert_ok!(result), "response");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let start = Instant::now();

        let result: Result<(), _> = with_retry(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(refused())
            },
            3,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(assert_err!(result), refused());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two back-offs between three attempts
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_later_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(
            move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(refused())
                } else {
                    Ok(42)
                }
            },
            3,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainCheckError::invalid_server(""))
            },
            3,
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(result, Err(DomainCheckError::InvalidServer { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _: Result<(), _> = with_retry(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(refused())
            },
            0,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
