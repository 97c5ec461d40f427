use super::*;
use serial_test::serial;
use std::env;

fn set_env(url: Option<&str>, token: Option<&str>) {
    unsafe {
        match url {
            Some(v) => env::set_var(BASE_URL_VAR, v),
            None => env::remove_var(BASE_URL_VAR),
        }
        match token {
            Some(v) => env::set_var(TOKEN_VAR, v),
            None => env::remove_var(TOKEN_VAR),
        }
    }
}

#[test]
#[serial]
fn test_from_env_reads_both_values() {
    set_env(Some("https://bitbucket.example.com/"), Some("secret-token"));

    let config = BitbucketConfig::from_env().expect("config should load");
    assert_eq!(config.base_url(), "https://bitbucket.example.com");
    assert_eq!(config.token(), "secret-token");

    set_env(None, None);
}

#[test]
#[serial]
fn test_missing_base_url_is_fatal() {
    set_env(None, Some("secret-token"));

    let err = BitbucketConfig::from_env().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar { name: BASE_URL_VAR }
    ));
    assert_eq!(
        err.to_string(),
        "BITBUCKET_URL environment variable is required"
    );

    set_env(None, None);
}

#[test]
#[serial]
fn test_missing_token_is_fatal() {
    set_env(Some("https://bitbucket.example.com"), None);

    let err = BitbucketConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar { name: TOKEN_VAR }));

    set_env(None, None);
}

#[test]
#[serial]
fn test_blank_values_count_as_missing() {
    set_env(Some("   "), Some("token"));
    assert!(matches!(
        BitbucketConfig::from_env(),
        Err(ConfigError::MissingEnvVar { name: BASE_URL_VAR })
    ));

    set_env(Some("https://bitbucket.example.com"), Some(""));
    assert!(matches!(
        BitbucketConfig::from_env(),
        Err(ConfigError::MissingEnvVar { name: TOKEN_VAR })
    ));

    set_env(None, None);
}

#[test]
fn test_new_rejects_relative_url() {
    let err = BitbucketConfig::new("bitbucket.example.com", "token").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
}

#[test]
fn test_new_rejects_non_http_scheme() {
    let err = BitbucketConfig::new("ftp://bitbucket.example.com", "token").unwrap_err();
    match err {
        ConfigError::InvalidBaseUrl { reason, .. } => assert!(reason.contains("ftp")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_new_keeps_context_path() {
    let config = BitbucketConfig::new("https://example.com/bitbucket///", "token").unwrap();
    assert_eq!(config.base_url(), "https://example.com/bitbucket");
}

#[test]
fn test_debug_redacts_token() {
    let config = BitbucketConfig::new("https://example.com", "super-secret").unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_serve_config_defaults() {
    let config = ServeConfig::default();
    assert_eq!(config.transport, Transport::Stdio);
    assert_eq!(config.host.to_string(), "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.log_directive(), "bitbucket_mcp=info");
}

#[test]
fn test_verbosity_raises_log_level() {
    let mut config = ServeConfig::default();
    config.verbosity = 1;
    assert_eq!(config.log_directive(), "bitbucket_mcp=debug");
    config.verbosity = 3;
    assert!(config.log_directive().contains("rmcp=debug"));
}
