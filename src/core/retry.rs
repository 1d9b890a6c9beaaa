use crate::utils::error::{Result, TrendError};
use std::future::Future;
use std::time::Duration;

/// Exponential backoff without jitter. `retries` counts extra attempts after
/// the first; the delay doubles each time but never exceeds `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.delay.min(policy.max_delay);
    let mut last_err: Option<TrendError> = None;

    for attempt in 0..=policy.retries {
        if attempt > 0 {
            tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying after failure");
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(policy.max_delay);
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "attempt failed");
                last_err = Some(e);
            }
        }
    }

    // retries >= 0 guarantees at least one attempt ran
    Err(last_err.expect("retry ran zero attempts"))
}
