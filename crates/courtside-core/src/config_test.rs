use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("CLIENT_ID", "abc123");
    m.insert("CLIENT_SECRET", "shh");
    m.insert("USER_AGENT", "courtside/0.1 by u/tester");
    m.insert("REDIRECT_URI", "http://localhost:8080");
    m
}

#[test]
fn build_app_config_fails_without_client_id() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CLIENT_ID"),
        "expected MissingEnvVar(CLIENT_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_secret_as_missing() {
    let mut map = full_env();
    map.insert("CLIENT_SECRET", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CLIENT_SECRET"),
        "expected MissingEnvVar(CLIENT_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_redirect_uri() {
    let mut map = full_env();
    map.remove("REDIRECT_URI");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "REDIRECT_URI"),
        "expected MissingEnvVar(REDIRECT_URI), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.client_id, "abc123");
    assert_eq!(cfg.user_agent, "courtside/0.1 by u/tester");
    assert_eq!(cfg.redirect_uri, "http://localhost:8080");
    assert_eq!(cfg.callback_addr.to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.callback_path, "/");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.oauth_scopes, vec!["read".to_string()]);
    assert_eq!(cfg.callback_timeout_secs, 300);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.token_exchange_retries, 2);
    assert_eq!(cfg.rate_limit_max_retries, 5);
    assert_eq!(cfg.rate_limit_max_wait_secs, 600);
}

#[test]
fn redirect_uri_requires_http_scheme() {
    let mut map = full_env();
    map.insert("REDIRECT_URI", "https://localhost:8080/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REDIRECT_URI"),
        "expected InvalidEnvVar(REDIRECT_URI), got: {result:?}"
    );
}

#[test]
fn redirect_uri_requires_loopback_host() {
    let mut map = full_env();
    map.insert("REDIRECT_URI", "http://example.com:8080/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, ref reason })
                if var == "REDIRECT_URI" && reason.contains("loopback")
        ),
        "expected loopback rejection, got: {result:?}"
    );
}

#[test]
fn redirect_uri_requires_explicit_port() {
    let mut map = full_env();
    map.insert("REDIRECT_URI", "http://127.0.0.1/callback");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REDIRECT_URI"),
        "expected InvalidEnvVar(REDIRECT_URI), got: {result:?}"
    );
}

#[test]
fn redirect_uri_keeps_callback_path() {
    let mut map = full_env();
    map.insert("REDIRECT_URI", "http://127.0.0.1:65010/authorize_callback");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.callback_path, "/authorize_callback");
    assert_eq!(cfg.callback_addr.port(), 65010);
}

#[test]
fn redirect_uri_accepts_ipv6_loopback() {
    let mut map = full_env();
    map.insert("REDIRECT_URI", "http://[::1]:9000/cb");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.callback_addr.to_string(), "[::1]:9000");
}

#[test]
fn oauth_scopes_accept_commas_and_spaces() {
    let mut map = full_env();
    map.insert("COURTSIDE_OAUTH_SCOPES", "read, history identity read");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.oauth_scopes, vec!["read", "history", "identity"]);
}

#[test]
fn oauth_scopes_rejects_empty_list() {
    let mut map = full_env();
    map.insert("COURTSIDE_OAUTH_SCOPES", " , ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "COURTSIDE_OAUTH_SCOPES"
        ),
        "expected InvalidEnvVar(COURTSIDE_OAUTH_SCOPES), got: {result:?}"
    );
}

#[test]
fn callback_timeout_override() {
    let mut map = full_env();
    map.insert("COURTSIDE_CALLBACK_TIMEOUT_SECS", "45");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.callback_timeout_secs, 45);
}

#[test]
fn callback_timeout_invalid() {
    let mut map = full_env();
    map.insert("COURTSIDE_CALLBACK_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "COURTSIDE_CALLBACK_TIMEOUT_SECS"
        ),
        "expected InvalidEnvVar(COURTSIDE_CALLBACK_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn rate_limit_overrides() {
    let mut map = full_env();
    map.insert("COURTSIDE_RATE_LIMIT_MAX_RETRIES", "9");
    map.insert("COURTSIDE_RATE_LIMIT_MAX_WAIT_SECS", "120");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rate_limit_max_retries, 9);
    assert_eq!(cfg.rate_limit_max_wait_secs, 120);
}

#[test]
fn rate_limit_max_retries_invalid() {
    let mut map = full_env();
    map.insert("COURTSIDE_RATE_LIMIT_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "COURTSIDE_RATE_LIMIT_MAX_RETRIES"
        ),
        "expected InvalidEnvVar(COURTSIDE_RATE_LIMIT_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_client_secret() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("shh"), "secret leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
