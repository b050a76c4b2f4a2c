use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation with doubling backoff, capped at `max_delay`.
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `max_attempts` - Total attempts, including the first
/// * `base_delay` - Delay before the first retry; doubles on each failure
/// * `max_delay` - Ceiling for the doubling delay
///
/// # Returns
/// The first successful result, or the last error once attempts run out.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay = base_delay;

    for attempt in 1..max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!(
                    "Request failed (attempt {attempt}/{max_attempts}): {e}. Retrying after {}ms...",
                    delay.as_millis()
                );
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
            }
        }
    }

    operation().await
}
