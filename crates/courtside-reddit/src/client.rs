//! Authorized HTTP client for Reddit's OAuth data API.
//!
//! Every request carries the session's bearer token and `raw_json=1`, checks
//! the session for expiry first, and runs under the rate-limit policy.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::RedditError;
use crate::retry::{with_rate_limit_retry, RateLimitPolicy};
use crate::types::AuthorizationSession;

const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com/";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for `oauth.reddit.com`.
///
/// Owns the [`AuthorizationSession`] for the rest of the run. Use
/// [`RedditClient::new`] for production or [`RedditClient::with_base_url`] to
/// point at a mock server in tests.
pub struct RedditClient {
    client: Client,
    session: AuthorizationSession,
    base_url: Url,
    policy: RateLimitPolicy,
}

impl RedditClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Request`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        session: AuthorizationSession,
        user_agent: &str,
        timeout_secs: u64,
        policy: RateLimitPolicy,
    ) -> Result<Self, RedditError> {
        Self::with_base_url(session, user_agent, timeout_secs, policy, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Request`] if the `reqwest::Client` cannot be
    /// constructed, or [`RedditError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        session: AuthorizationSession,
        user_agent: &str,
        timeout_secs: u64,
        policy: RateLimitPolicy,
        base_url: &str,
    ) -> Result<Self, RedditError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends rather than replaces.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RedditError::InvalidUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            session,
            base_url,
            policy,
        })
    }

    #[must_use]
    pub fn session(&self) -> &AuthorizationSession {
        &self.session
    }

    /// Builds a data-endpoint URL with `raw_json=1` plus `params`.
    pub(crate) fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, RedditError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RedditError::InvalidUrl(format!("'{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("raw_json", "1");
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GETs `url` and parses the body as JSON, waiting out 429 responses per
    /// the configured [`RateLimitPolicy`].
    pub(crate) async fn get_json(&self, url: &Url) -> Result<serde_json::Value, RedditError> {
        with_rate_limit_retry(self.policy, || self.get_json_once(url)).await
    }

    async fn get_json_once(&self, url: &Url) -> Result<serde_json::Value, RedditError> {
        if self.session.is_expired() {
            return Err(RedditError::SessionExpired {
                expired_at: self.session.expires_at.unwrap_or_default(),
            });
        }

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(self.session.access_token())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RedditError::RateLimited {
                retry_after_secs: retry_after_secs(&response),
            });
        }
        if status.is_server_error() {
            return Err(RedditError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RedditError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

/// Reads the back-off delay from a 429: `Retry-After`, then Reddit's
/// `x-ratelimit-reset`, then a flat default.
fn retry_after_secs(response: &Response) -> u64 {
    if let Some(secs) = header_str(response, reqwest::header::RETRY_AFTER.as_str())
        .and_then(|s| s.parse::<u64>().ok())
    {
        return secs;
    }
    header_str(response, "x-ratelimit-reset")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = secs.ceil() as u64;
            whole
        })
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}
