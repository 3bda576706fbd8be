use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures of the browser-redirect OAuth handshake. All of them end the run.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The operator never completed the browser flow.
    #[error("authorization timed out after {}s waiting for the browser callback", .0.as_secs())]
    Timeout(Duration),

    /// The callback carried a `state` other than the one issued for this run.
    #[error("authorization callback state did not match the issued nonce (state_mismatch)")]
    StateMismatch,

    /// The provider redirected back with `error=...` (e.g. `access_denied`).
    #[error("authorization denied by provider: {0}")]
    Denied(String),

    #[error("authorization callback carried no code")]
    MissingCode,

    /// The code could not be exchanged for an access token.
    #[error("token exchange failed (exchange_failed): {0}")]
    ExchangeFailed(String),

    #[error("invalid OAuth endpoint: {0}")]
    InvalidEndpoint(String),

    /// The loopback listener could not be bound or stopped unexpectedly.
    #[error("callback listener error: {0}")]
    Listener(#[from] std::io::Error),
}

/// Errors returned by [`crate::RedditClient`].
#[derive(Debug, Error)]
pub enum RedditError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTP 429; the server has asked us to back off.
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Non-retriable 4xx response.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// 5xx response.
    #[error("server error {status} from {url}")]
    Server { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The caller asked for something the API cannot express.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("access token expired at {expired_at}")]
    SessionExpired { expired_at: DateTime<Utc> },

    /// Rate-limit waits exceeded the configured ceiling.
    #[error("collection aborted after {retries} rate-limit retries ({waited_secs}s spent waiting)")]
    CollectionAborted { retries: u32, waited_secs: u64 },
}

impl RedditError {
    /// Fatal errors end the whole run; everything else only costs the current item.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RedditError::SessionExpired { .. } | RedditError::CollectionAborted { .. }
        )
    }
}
