use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::Url;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let client_id = require("CLIENT_ID")?;
    let client_secret = require("CLIENT_SECRET")?;
    let user_agent = require("USER_AGENT")?;
    let redirect_uri = require("REDIRECT_URI")?.trim().to_string();
    let (callback_addr, callback_path) = parse_redirect_uri(&redirect_uri)?;

    let log_level = or_default("COURTSIDE_LOG_LEVEL", "info");
    let oauth_scopes = parse_scopes(&or_default("COURTSIDE_OAUTH_SCOPES", "read"))?;

    let callback_timeout_secs = parse_u64("COURTSIDE_CALLBACK_TIMEOUT_SECS", "300")?;
    let request_timeout_secs = parse_u64("COURTSIDE_REQUEST_TIMEOUT_SECS", "30")?;
    let token_exchange_retries = parse_u32("COURTSIDE_TOKEN_EXCHANGE_RETRIES", "2")?;
    let rate_limit_max_retries = parse_u32("COURTSIDE_RATE_LIMIT_MAX_RETRIES", "5")?;
    let rate_limit_max_wait_secs = parse_u64("COURTSIDE_RATE_LIMIT_MAX_WAIT_SECS", "600")?;

    Ok(AppConfig {
        client_id,
        client_secret,
        user_agent,
        redirect_uri,
        callback_addr,
        callback_path,
        log_level,
        oauth_scopes,
        callback_timeout_secs,
        request_timeout_secs,
        token_exchange_retries,
        rate_limit_max_retries,
        rate_limit_max_wait_secs,
    })
}

/// Validate the OAuth redirect URI and derive the callback bind address and path.
///
/// The callback listener binds the URI's host and port, so the URI must be a
/// plain `http` loopback address with an explicit port.
fn parse_redirect_uri(raw: &str) -> Result<(SocketAddr, String), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "REDIRECT_URI".to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!("scheme must be http, got {}", url.scheme())));
    }
    let ip = match url.host_str() {
        Some("localhost" | "127.0.0.1") => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Some("[::1]") => IpAddr::V6(Ipv6Addr::LOCALHOST),
        Some(host) => return Err(invalid(format!("host must be loopback, got {host}"))),
        None => return Err(invalid("missing host".to_string())),
    };
    let port = url
        .port()
        .ok_or_else(|| invalid("an explicit port is required".to_string()))?;
    Ok((SocketAddr::new(ip, port), url.path().to_string()))
}

/// Split a scope list on commas and/or whitespace, dropping duplicates.
fn parse_scopes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut scopes: Vec<String> = Vec::new();
    for scope in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let scope = scope.trim();
        if !scope.is_empty() && !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }
    }
    if scopes.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "COURTSIDE_OAUTH_SCOPES".to_string(),
            reason: "at least one scope is required".to_string(),
        });
    }
    Ok(scopes)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
