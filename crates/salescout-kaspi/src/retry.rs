//! Bounded retry with exponential backoff for offers requests.
//!
//! Only upstream failures (transport errors, non-2xx statuses, undecodable
//! bodies) are retried; see [`KaspiError::is_upstream`]. Everything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::KaspiError;

/// Delay slept after failed attempt `attempt` (zero-based): `base * 2^attempt`.
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(31))
}

/// Runs `operation` up to `max_attempts` times, passing the zero-based
/// attempt index so callers can rotate per-attempt resources.
///
/// # Backoff schedule (example with `backoff_base = 300ms`, 3 attempts)
///
/// | Attempt | Sleep after failure  |
/// |---------|----------------------|
/// | 0       | 300 ms               |
/// | 1       | 600 ms               |
/// | 2       | none, error returned |
///
/// `max_attempts` of zero is treated as one.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, KaspiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, KaspiError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_upstream() || attempt + 1 >= max_attempts {
            return Err(err);
        }

        let delay = backoff_delay(backoff_base, attempt);
        #[allow(clippy::cast_possible_truncation)]
        let delay_ms = delay.as_millis() as u64;
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms,
            error = %err,
            "Kaspi offers request failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
