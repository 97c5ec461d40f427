//! Process configuration.
//!
//! Upstream connection settings come from the environment (`BITBUCKET_URL`,
//! `BITBUCKET_TOKEN`) and are read exactly once at startup. Transport settings
//! come from the command line and live in [`ServeConfig`].

use std::env;
use std::net::IpAddr;

use miette::Diagnostic;
use reqwest::Url;
use thiserror::Error;

/// Environment variable holding the Bitbucket Server base URL.
pub const BASE_URL_VAR: &str = "BITBUCKET_URL";

/// Environment variable holding the personal access token.
pub const TOKEN_VAR: &str = "BITBUCKET_TOKEN";

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("{name} environment variable is required")]
    #[diagnostic(
        code(bitbucket_mcp::config::missing_env_var),
        help("Set {name} in the environment or in a .env file in the working directory.")
    )]
    MissingEnvVar { name: &'static str },

    #[error("Invalid Bitbucket base URL '{value}': {reason}")]
    #[diagnostic(
        code(bitbucket_mcp::config::invalid_base_url),
        help("Use the server root, e.g. https://bitbucket.example.com")
    )]
    InvalidBaseUrl { value: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Connection settings for the upstream Bitbucket Server.
#[derive(Clone)]
pub struct BitbucketConfig {
    base_url: String,
    token: String,
}

impl BitbucketConfig {
    /// Build a config from explicit values.
    ///
    /// The base URL must be an absolute http(s) URL; trailing slashes are
    /// trimmed so path templates can be appended directly.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ConfigResult<Self> {
        let raw = base_url.into();
        let trimmed = raw.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEnvVar { name: BASE_URL_VAR });
        }

        let parsed = Url::parse(&trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: raw,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar { name: TOKEN_VAR });
        }

        Ok(Self {
            base_url: trimmed,
            token,
        })
    }

    /// Read `BITBUCKET_URL` and `BITBUCKET_TOKEN` from the process environment.
    ///
    /// Empty values are treated as missing.
    pub fn from_env() -> ConfigResult<Self> {
        let base_url = read_required(BASE_URL_VAR)?;
        let token = read_required(TOKEN_VAR)?;
        Self::new(base_url, token)
    }

    /// Server root without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token sent with every request.
    pub fn token(&self) -> &str {
        &self.token
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for BitbucketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn read_required(name: &'static str) -> ConfigResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar { name }),
    }
}

/// How the MCP server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP mounted at `/mcp`
    Http,
}

/// Transport and logging settings.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub transport: Transport,
    /// Host address to bind to (HTTP transport only)
    pub host: IpAddr,
    /// Port to listen on (HTTP transport only)
    pub port: u16,
    /// Number of `-v` flags
    pub verbosity: u8,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            verbosity: 0,
        }
    }
}

impl ServeConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "bitbucket_mcp=info",
            1 => "bitbucket_mcp=debug",
            _ => "bitbucket_mcp=trace,rmcp=debug,tower_http=debug",
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
