//! Back-off helpers for the Reddit client.
//!
//! Two policies live here. [`with_rate_limit_retry`] honours the server's own
//! `Retry-After` for HTTP 429 and gives up once a cumulative ceiling is hit.
//! [`retry_transient`] retries network failures and 5xx with exponential
//! back-off and jitter, and is used for the one-off token exchange.

use std::future::Future;
use std::time::Duration;

use crate::error::RedditError;

/// Ceiling on how long collection will keep waiting out 429 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Retries allowed for a single request.
    pub max_retries: u32,
    /// Total time a single request may spend sleeping before it is abandoned.
    pub max_total_wait: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            max_total_wait: Duration::from_secs(600),
        }
    }
}

impl RateLimitPolicy {
    #[must_use]
    pub fn new(max_retries: u32, max_total_wait: Duration) -> Self {
        Self {
            max_retries,
            max_total_wait,
        }
    }
}

/// Runs `operation`, sleeping exactly the server-advertised delay after each
/// [`RedditError::RateLimited`] and retrying.
///
/// Once `policy.max_retries` is reached or the next sleep would push the total
/// wait past `policy.max_total_wait`, returns
/// [`RedditError::CollectionAborted`]. Any other error is returned as is.
pub(crate) async fn with_rate_limit_retry<T, F, Fut>(
    policy: RateLimitPolicy,
    mut operation: F,
) -> Result<T, RedditError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RedditError>>,
{
    let mut retries = 0u32;
    let mut waited_secs = 0u64;
    loop {
        match operation().await {
            Err(RedditError::RateLimited { retry_after_secs }) => {
                let next_total = waited_secs.saturating_add(retry_after_secs);
                if retries >= policy.max_retries || next_total > policy.max_total_wait.as_secs() {
                    tracing::error!(
                        retries,
                        waited_secs,
                        retry_after_secs,
                        "rate-limit ceiling reached, aborting collection"
                    );
                    return Err(RedditError::CollectionAborted {
                        retries,
                        waited_secs,
                    });
                }
                retries += 1;
                tracing::warn!(
                    retry_after_secs,
                    attempt = retries,
                    max_retries = policy.max_retries,
                    "rate limited by Reddit, sleeping before retry"
                );
                tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                waited_secs = next_total;
            }
            other => return other,
        }
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on errors for
/// which `is_retriable` holds.
///
/// Delay before attempt `n` is `backoff_base_ms * 2^(n-1)` capped at 30 s, with
/// ±25 % jitter.
pub(crate) async fn retry_transient<T, E, F, Fut, R>(
    max_retries: u32,
    backoff_base_ms: u64,
    is_retriable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
