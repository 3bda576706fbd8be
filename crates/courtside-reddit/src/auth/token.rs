//! Authorization-code exchange against the token endpoint.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::Deserialize;

use super::OAuthSettings;
use crate::error::AuthorizationError;
use crate::retry::retry_transient;
use crate::types::AuthorizationSession;

const EXCHANGE_BACKOFF_BASE_MS: u64 = 500;

/// Token endpoint body. Reddit answers some failures with HTTP 200 and an
/// `error` field, which may be a string or a numeric status.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
enum ExchangeAttemptError {
    #[error("{0}")]
    Transient(String),
    #[error("{0}")]
    Rejected(String),
}

fn is_transient(err: &ExchangeAttemptError) -> bool {
    matches!(err, ExchangeAttemptError::Transient(_))
}

/// Exchanges `code` for an [`AuthorizationSession`], retrying connection
/// failures, timeouts and 5xx up to `settings.exchange_retries` times.
pub(super) async fn exchange_code(
    http: &reqwest::Client,
    settings: &OAuthSettings,
    code: &str,
) -> Result<AuthorizationSession, AuthorizationError> {
    let response = retry_transient(
        settings.exchange_retries,
        EXCHANGE_BACKOFF_BASE_MS,
        is_transient,
        || request_token(http, settings, code),
    )
    .await
    .map_err(|e| AuthorizationError::ExchangeFailed(e.to_string()))?;

    session_from_response(response, &settings.scopes)
}

async fn request_token(
    http: &reqwest::Client,
    settings: &OAuthSettings,
    code: &str,
) -> Result<TokenResponse, ExchangeAttemptError> {
    let response = http
        .post(settings.token_url.clone())
        .basic_auth(&settings.client_id, Some(&settings.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ExchangeAttemptError::Transient(e.to_string())
            } else {
                ExchangeAttemptError::Rejected(e.to_string())
            }
        })?;

    let status = response.status();
    if status.is_server_error() {
        return Err(ExchangeAttemptError::Transient(format!(
            "token endpoint returned {status}"
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| ExchangeAttemptError::Transient(e.to_string()))?;
    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(ExchangeAttemptError::Rejected(format!(
            "token endpoint returned {status}: {snippet}"
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| ExchangeAttemptError::Rejected(format!("unparsable token response: {e}")))
}

fn session_from_response(
    response: TokenResponse,
    requested_scopes: &[String],
) -> Result<AuthorizationSession, AuthorizationError> {
    if let Some(error) = response.error {
        let reason = match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(AuthorizationError::ExchangeFailed(reason));
    }
    let access_token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AuthorizationError::ExchangeFailed("response carried no access_token".to_string())
        })?;

    let expires_at = response
        .expires_in
        .filter(|secs| *secs > 0)
        .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

    let granted: BTreeSet<String> = response
        .scope
        .as_deref()
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let scopes = if granted.is_empty() {
        requested_scopes.iter().cloned().collect()
    } else {
        granted
    };

    tracing::info!(
        scopes = ?scopes,
        expires_at = ?expires_at,
        "authorization session established"
    );
    Ok(AuthorizationSession::new(access_token, expires_at, scopes)
        .with_refresh_token(response.refresh_token))
}
