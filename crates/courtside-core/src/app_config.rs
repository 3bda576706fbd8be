use std::net::SocketAddr;

/// Runtime configuration for one collection run.
///
/// Credentials come from the registered Reddit "installed/web app" and the
/// redirect URI must match the one registered with the provider.
#[derive(Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    /// Redirect URI exactly as configured; sent verbatim to the provider.
    pub redirect_uri: String,
    /// Loopback address the callback listener binds, derived from `redirect_uri`.
    pub callback_addr: SocketAddr,
    /// Path component of `redirect_uri`; the listener's only route.
    pub callback_path: String,
    pub log_level: String,
    pub oauth_scopes: Vec<String>,
    pub callback_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub token_exchange_retries: u32,
    pub rate_limit_max_retries: u32,
    pub rate_limit_max_wait_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("redirect_uri", &self.redirect_uri)
            .field("callback_addr", &self.callback_addr)
            .field("callback_path", &self.callback_path)
            .field("log_level", &self.log_level)
            .field("oauth_scopes", &self.oauth_scopes)
            .field("callback_timeout_secs", &self.callback_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_exchange_retries", &self.token_exchange_retries)
            .field("rate_limit_max_retries", &self.rate_limit_max_retries)
            .field("rate_limit_max_wait_secs", &self.rate_limit_max_wait_secs)
            .finish()
    }
}
