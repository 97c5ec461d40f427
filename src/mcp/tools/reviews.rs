//! Review tools

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::bitbucket::models::ParticipantStatus;
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::{PullRequestParams, json_result, map_bitbucket_error};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateReviewStatusParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "APPROVED, NEEDS_WORK or UNAPPROVED")]
    pub status: ParticipantStatus,
}

#[tool_router(router = review_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "Set the caller's own review status on a pull request: APPROVED, NEEDS_WORK or UNAPPROVED.")]
    pub async fn bitbucket_update_review_status(
        &self,
        params: Parameters<UpdateReviewStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let participant = self
            .client()
            .update_review_status(&params.0.pull_request.key(), params.0.status)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&participant)
    }
}
