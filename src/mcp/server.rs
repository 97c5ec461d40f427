//! MCP server implementation
//!
//! [`BitbucketServer`] is the tool registry. Each tool group in
//! [`crate::mcp::tools`] contributes its own router; they are summed here.

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::bitbucket::BitbucketClient;

const INSTRUCTIONS: &str = "Bitbucket Server tools for reviewing pull requests. \
Start with bitbucket_get_inbox_pull_requests to find pull requests awaiting review, \
read them with bitbucket_get_pull_request, bitbucket_get_pull_request_changes and \
bitbucket_get_pull_request_file_diff, then comment and set a review status. \
Paged results carry start/limit/isLastPage/nextPageStart; pass nextPageStart as start \
to fetch the next page.";

/// Bitbucket Server MCP server
///
/// Holds one shared API client; cloning the server is cheap and every clone
/// talks to the same upstream instance.
#[derive(Clone)]
pub struct BitbucketServer {
    client: Arc<BitbucketClient>,
    tool_router: ToolRouter<Self>,
}

impl BitbucketServer {
    pub fn new(client: impl Into<Arc<BitbucketClient>>) -> Self {
        Self {
            client: client.into(),
            tool_router: Self::user_tools()
                + Self::project_tools()
                + Self::repo_tools()
                + Self::pull_request_tools()
                + Self::comment_tools()
                + Self::review_tools(),
        }
    }

    pub(crate) fn client(&self) -> &BitbucketClient {
        &self.client
    }

    /// Get the combined tool router
    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for BitbucketServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }
}
