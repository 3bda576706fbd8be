//! Browser-redirect OAuth handshake.
//!
//! [`AuthorizationCoordinator::authorize`] runs the whole sequence: issue an
//! authorization URL with a fresh `state` nonce, bind the loopback
//! [`CallbackListener`], let the caller open the URL, wait for the redirect,
//! stop the listener, then exchange the code for an [`AuthorizationSession`].

mod callback;
mod token;

use std::net::SocketAddr;
use std::time::Duration;

use courtside_core::AppConfig;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Url};

use crate::error::AuthorizationError;
use crate::types::{AuthorizationSession, PendingAuthorization};

pub use callback::CallbackListener;

const AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const STATE_LEN: usize = 32;

/// Everything the handshake needs, resolved from [`AppConfig`].
#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    /// Sent to the provider exactly as registered.
    pub redirect_uri: String,
    pub callback_addr: SocketAddr,
    pub callback_path: String,
    pub scopes: Vec<String>,
    pub callback_timeout: Duration,
    pub request_timeout: Duration,
    pub exchange_retries: u32,
    pub authorize_url: Url,
    pub token_url: Url,
}

impl OAuthSettings {
    /// Builds settings pointed at Reddit's production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidEndpoint`] if a built-in endpoint
    /// fails to parse.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AuthorizationError> {
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_agent: config.user_agent.clone(),
            redirect_uri: config.redirect_uri.clone(),
            callback_addr: config.callback_addr,
            callback_path: config.callback_path.clone(),
            scopes: config.oauth_scopes.clone(),
            callback_timeout: Duration::from_secs(config.callback_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            exchange_retries: config.token_exchange_retries,
            authorize_url: parse_endpoint(AUTHORIZE_URL)?,
            token_url: parse_endpoint(TOKEN_URL)?,
        })
    }

    /// Overrides the provider endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidEndpoint`] if either URL fails to parse.
    pub fn with_endpoints(
        mut self,
        authorize_url: &str,
        token_url: &str,
    ) -> Result<Self, AuthorizationError> {
        self.authorize_url = parse_endpoint(authorize_url)?;
        self.token_url = parse_endpoint(token_url)?;
        Ok(self)
    }
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("redirect_uri", &self.redirect_uri)
            .field("callback_addr", &self.callback_addr)
            .field("scopes", &self.scopes)
            .field("callback_timeout", &self.callback_timeout)
            .field("authorize_url", &self.authorize_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, AuthorizationError> {
    Url::parse(raw).map_err(|e| AuthorizationError::InvalidEndpoint(format!("'{raw}': {e}")))
}

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

/// Drives the authorization-code handshake for one run.
pub struct AuthorizationCoordinator {
    settings: OAuthSettings,
    http: Client,
}

impl AuthorizationCoordinator {
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ExchangeFailed`] if the HTTP client used
    /// for the token exchange cannot be constructed.
    pub fn new(settings: OAuthSettings) -> Result<Self, AuthorizationError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| {
                AuthorizationError::ExchangeFailed(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { settings, http })
    }

    #[must_use]
    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Issues the authorization URL together with the pending state it embeds.
    #[must_use]
    pub fn begin_authorization(&self) -> (Url, PendingAuthorization) {
        let state = generate_state();
        let mut url = self.settings.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", &state)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("duration", "permanent")
            .append_pair("scope", &self.settings.scopes.join(" "));
        (url, PendingAuthorization::new(state))
    }

    /// Exchanges an authorization code for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ExchangeFailed`] if the provider rejects
    /// the code or stays unreachable after the configured retries.
    pub async fn complete_authorization(
        &self,
        code: &str,
    ) -> Result<AuthorizationSession, AuthorizationError> {
        token::exchange_code(&self.http, &self.settings, code).await
    }

    /// Runs the full handshake. `open` is called with the authorization URL
    /// once the callback listener is serving; it typically launches a browser.
    ///
    /// # Errors
    ///
    /// Any [`AuthorizationError`]; none of them are retried.
    pub async fn authorize<F>(&self, open: F) -> Result<AuthorizationSession, AuthorizationError>
    where
        F: FnOnce(&Url),
    {
        let (url, mut pending) = self.begin_authorization();
        let listener = CallbackListener::bind(
            self.settings.callback_addr,
            &self.settings.callback_path,
            pending.state(),
        )
        .await?;

        open(&url);

        let code = listener.wait(self.settings.callback_timeout).await?;
        pending.record_code(code);
        let code = pending.into_code().ok_or(AuthorizationError::MissingCode)?;

        tracing::info!("authorization code received, exchanging for token");
        self.complete_authorization(&code).await
    }
}
