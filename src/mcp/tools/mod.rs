//! MCP tool implementations
//!
//! Tools are grouped by the upstream area they touch. Every group is a
//! separate `#[tool_router]` block on [`BitbucketServer`](crate::mcp::BitbucketServer);
//! the server sums the group routers into the one it serves.

pub mod comments;
pub mod projects;
pub mod pull_requests;
pub mod repos;
pub mod reviews;
pub mod users;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::bitbucket::BitbucketError;
use crate::bitbucket::models::PullRequestKey;

/// Coordinates shared by every pull-request scoped tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestParams {
    #[schemars(description = "Bitbucket project key, e.g. PRJ")]
    pub project_key: String,
    #[schemars(description = "Repository slug within the project")]
    pub repository_slug: String,
    #[schemars(description = "Numeric pull request ID")]
    pub pull_request_id: u64,
}

impl PullRequestParams {
    pub fn key(&self) -> PullRequestKey {
        PullRequestKey::new(&self.project_key, &self.repository_slug, self.pull_request_id)
    }
}

/// Pretty-print a payload as the single text content of a tool result.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub(crate) fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Map client errors onto MCP errors.
///
/// Rejected input is the caller's fault (`invalid_params`); everything else
/// is reported as an internal error carrying the upstream status when known.
pub(crate) fn map_bitbucket_error(err: BitbucketError) -> McpError {
    match err {
        BitbucketError::InvalidInput { message } => McpError::invalid_params(message, None),
        other => {
            let data = match other.status() {
                Some(status) => json!({"kind": other.kind(), "status": status}),
                None => json!({"kind": other.kind()}),
            };
            McpError::internal_error(
                format!("Bitbucket Server API error: {}", other),
                Some(data),
            )
        }
    }
}

/// Text of the first content item of a tool result.
#[cfg(test)]
pub(crate) fn tool_text(result: &CallToolResult) -> String {
    match &result.content[0].raw {
        rmcp::model::RawContent::Text(text) => text.text.clone(),
        _ => panic!("Expected text content"),
    }
}
