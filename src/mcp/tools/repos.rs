//! Repository tools

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::{json_result, map_bitbucket_error};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListRepositoriesParams {
    #[schemars(description = "Bitbucket project key, e.g. PRJ")]
    pub project_key: String,
}

#[tool_router(router = repo_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "List the repositories of a Bitbucket Server project.")]
    pub async fn bitbucket_list_repositories(
        &self,
        params: Parameters<ListRepositoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = self
            .client()
            .list_repositories(&params.0.project_key)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&page)
    }
}

#[cfg(test)]
#[path = "repos_test.rs"]
mod repos_test;
