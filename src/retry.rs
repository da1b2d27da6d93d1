use crate::config::RetryConfig;
use crate::error::{AskError, AskResult};
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;

/// Run an operation with bounded exponential backoff.
///
/// Only errors for which [`AskError::is_retryable`] holds are retried, and
/// `max_attempts` counts the first call, so the default of 1 never retries.
pub async fn with_retry<T, F, Fut>(policy: &RetryConfig, operation: &str, f: F) -> AskResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AskResult<T>>,
{
    let retries = policy.max_attempts.saturating_sub(1);
    if retries == 0 {
        let mut f = f;
        return f().await;
    }

    f.retry(
        ExponentialBuilder::default()
            .with_max_times(retries)
            .with_min_delay(Duration::from_millis(policy.min_delay_ms))
            .with_max_delay(Duration::from_millis(policy.max_delay_ms)),
    )
    .when(AskError::is_retryable)
    .notify(|err: &AskError, dur: Duration| {
        tracing::warn!("{} failed, retrying in {:?}: {}", operation, dur, err);
    })
    .await
}
