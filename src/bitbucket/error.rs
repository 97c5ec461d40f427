//! Error types for upstream Bitbucket Server calls.

use miette::Diagnostic;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum BitbucketError {
    #[error("Invalid input: {message}")]
    #[diagnostic(code(bitbucket_mcp::bitbucket::invalid_input))]
    InvalidInput { message: String },

    #[error("{message}")]
    #[diagnostic(code(bitbucket_mcp::bitbucket::api_error))]
    Api { status: u16, message: String },

    #[error("{source}")]
    #[diagnostic(
        code(bitbucket_mcp::bitbucket::transport),
        help("Check that BITBUCKET_URL points at a reachable Bitbucket Server.")
    )]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from Bitbucket Server: {message}")]
    #[diagnostic(code(bitbucket_mcp::bitbucket::invalid_response))]
    InvalidResponse { message: String },

    #[error("Cannot determine caller identity: {source}")]
    #[diagnostic(code(bitbucket_mcp::bitbucket::identity_lookup))]
    IdentityLookup {
        #[source]
        source: Box<BitbucketError>,
    },

    #[error("Could not determine authenticated user from response headers.")]
    #[diagnostic(
        code(bitbucket_mcp::bitbucket::missing_identity),
        help("The server did not return an X-AUSERNAME header. Is the token valid?")
    )]
    MissingIdentity,
}

impl BitbucketError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Build an [`BitbucketError::Api`] from a non-2xx status and its raw body.
    ///
    /// Bitbucket reports failures as `{"errors": [{"message": ...}]}`; some
    /// endpoints use a flat `{"message": ...}` instead.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| extract_message(&v))
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        Self::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Upstream HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport { source } => source.status().map(|s| s.as_u16()),
            Self::IdentityLookup { source } => source.status(),
            _ => None,
        }
    }

    /// Short machine-readable label used in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::Api { .. } => "api_error",
            Self::Transport { .. } => "transport_error",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::IdentityLookup { .. } | Self::MissingIdentity => "missing_identity",
        }
    }
}

fn extract_message(body: &Value) -> Option<String> {
    body.pointer("/errors/0/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
}

impl From<reqwest::Error> for BitbucketError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BitbucketError::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            BitbucketError::Transport { source: e }
        }
    }
}

impl From<serde_json::Error> for BitbucketError {
    fn from(e: serde_json::Error) -> Self {
        BitbucketError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

pub type BitbucketResult<T> = Result<T, BitbucketError>;
