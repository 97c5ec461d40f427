//! User tools

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
pub struct GetUserProfileParams {
    #[schemars(description = "Username (slug) of the Bitbucket Server user")]
    pub username: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetAllUsersParams {
    #[schemars(description = "Partial match against username, display name or email")]
    pub filter: Option<String>,
}

#[tool_router(router = user_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "Get the profile of a Bitbucket Server user by username.")]
    pub async fn bitbucket_get_user_profile(
        &self,
        params: Parameters<GetUserProfileParams>,
    ) -> Result<CallToolResult, McpError> {
        let profile = self
            .client()
            .get_user_profile(&params.0.username)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&profile)
    }

    #[tool(description = "List one page of Bitbucket Server users, optionally filtered by a search term.")]
    pub async fn bitbucket_get_all_users(
        &self,
        params: Parameters<GetAllUsersParams>,
    ) -> Result<CallToolResult, McpError> {
        let users = self
            .client()
            .get_all_users(params.0.filter.as_deref())
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&users)
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;
