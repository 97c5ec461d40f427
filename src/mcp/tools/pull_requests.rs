//! Pull request tools
//!
//! Reads are passed through verbatim except for the inbox and the activity
//! log, which are shaped before they are returned.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::bitbucket::DiffBody;
use crate::bitbucket::models::{
    ActivityAction, DiffFormat, DiffQuery, NewPullRequest, PageQuery, Whitespace,
};
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::{PullRequestParams, json_result, map_bitbucket_error, text_result};
use crate::shaping::{shape_activity_page, shape_inbox_page};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetInboxPullRequestsParams {
    #[schemars(description = "Index of the first pull request to return (default: 0)")]
    pub start: Option<u32>,
    #[schemars(description = "Page size (server default: 25)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetPullRequestParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetPullRequestChangesParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Maximum number of changed files to return (server default: 25)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestDiffParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Path of a single file to diff; omit for the whole pull request")]
    pub path: Option<String>,
    #[schemars(description = "Commit to diff from")]
    pub since_id: Option<String>,
    #[schemars(description = "Commit to diff up to")]
    pub until_id: Option<String>,
    #[schemars(description = "Context lines around each change (server default: 10)")]
    pub context_lines: Option<u32>,
    #[schemars(description = "Whitespace handling: show (default) or ignore-all")]
    pub whitespace: Option<Whitespace>,
    #[schemars(description = "text for a unified diff (default), json for hunks/segments/lines")]
    pub format: Option<DiffFormat>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestFileDiffParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Path of the file to diff, e.g. src/main.rs")]
    pub path: String,
    #[schemars(description = "Context lines around each change (server default: 10)")]
    pub context_lines: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestActivitiesParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Only return activities with these actions, e.g. [\"COMMENTED\", \"APPROVED\"]. Filtering happens on the returned page; size is recomputed but start/isLastPage/nextPageStart still describe the unfiltered page.")]
    pub activity_types: Option<Vec<ActivityAction>>,
    #[schemars(description = "Index of the first activity to return (default: 0)")]
    pub start: Option<u32>,
    #[schemars(description = "Page size (server default: 25)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestParams {
    #[schemars(description = "Bitbucket project key, e.g. PRJ")]
    pub project_key: String,
    #[schemars(description = "Repository slug within the project")]
    pub repository_slug: String,
    #[schemars(description = "Source branch, e.g. feature-x (expanded to refs/heads/feature-x)")]
    pub from_branch: String,
    #[schemars(description = "Target branch, e.g. main")]
    pub to_branch: String,
    #[schemars(description = "Pull request title")]
    pub title: String,
    #[schemars(description = "Pull request description (markdown)")]
    pub description: Option<String>,
    #[schemars(description = "Usernames to add as reviewers")]
    pub reviewers: Option<Vec<String>>,
}

#[tool_router(router = pull_request_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "List pull requests in the caller's inbox (where they are a reviewer) across all repositories. Each entry carries only id, title, description, state, author, projectKey, repositorySlug, createdDate and updatedDate.")]
    pub async fn bitbucket_get_inbox_pull_requests(
        &self,
        params: Parameters<GetInboxPullRequestsParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = PageQuery {
            start: params.0.start,
            limit: params.0.limit,
        };
        let inbox = self
            .client()
            .get_inbox_pull_requests(&page)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&shape_inbox_page(inbox))
    }

    #[tool(description = "Get full details of a pull request: title, description, author, state, refs, reviewers and participants.")]
    pub async fn bitbucket_get_pull_request(
        &self,
        params: Parameters<GetPullRequestParams>,
    ) -> Result<CallToolResult, McpError> {
        let pr = self
            .client()
            .get_pull_request(&params.0.pull_request.key())
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&pr)
    }

    #[tool(description = "List the files changed by a pull request, with comment counts per file.")]
    pub async fn bitbucket_get_pull_request_changes(
        &self,
        params: Parameters<GetPullRequestChangesParams>,
    ) -> Result<CallToolResult, McpError> {
        let changes = self
            .client()
            .get_pull_request_changes(&params.0.pull_request.key(), params.0.limit)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&changes)
    }

    #[tool(description = "Get the diff of a pull request or of one file in it. format=text returns a unified diff as-is; format=json returns structured hunks.")]
    pub async fn bitbucket_get_pull_request_diff(
        &self,
        params: Parameters<GetPullRequestDiffParams>,
    ) -> Result<CallToolResult, McpError> {
        let GetPullRequestDiffParams {
            pull_request,
            path,
            since_id,
            until_id,
            context_lines,
            whitespace,
            format,
        } = params.0;
        let query = DiffQuery {
            since_id,
            until_id,
            context_lines,
            whitespace,
        };

        let diff = self
            .client()
            .get_pull_request_diff(
                &pull_request.key(),
                path.as_deref(),
                &query,
                format.unwrap_or_default(),
            )
            .await
            .map_err(map_bitbucket_error)?;

        match diff {
            DiffBody::Text(text) => Ok(text_result(text)),
            DiffBody::Json(value) => json_result(&value),
        }
    }

    #[tool(description = "Get the structured diff of one file. Lines carry source/destination line numbers; use the destination number to place a line comment.")]
    pub async fn bitbucket_get_pull_request_file_diff(
        &self,
        params: Parameters<GetPullRequestFileDiffParams>,
    ) -> Result<CallToolResult, McpError> {
        let diff = self
            .client()
            .get_pull_request_file_diff(
                &params.0.pull_request.key(),
                &params.0.path,
                params.0.context_lines,
            )
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&diff)
    }

    #[tool(description = "Get the activity log of a pull request (comments, approvals, merges, rescopes), optionally filtered by action. Attached diffs and links are stripped.")]
    pub async fn bitbucket_get_pull_request_activities(
        &self,
        params: Parameters<GetPullRequestActivitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = PageQuery {
            start: params.0.start,
            limit: params.0.limit,
        };
        let activities = self
            .client()
            .get_pull_request_activities(&params.0.pull_request.key(), &page)
            .await
            .map_err(map_bitbucket_error)?;

        let shaped = shape_activity_page(activities, params.0.activity_types.as_deref());
        json_result(&shaped)
    }

    #[tool(description = "Create a pull request between two branches of the same repository.")]
    pub async fn create_pull_request(
        &self,
        params: Parameters<CreatePullRequestParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreatePullRequestParams {
            project_key,
            repository_slug,
            from_branch,
            to_branch,
            title,
            description,
            reviewers,
        } = params.0;
        let request = NewPullRequest {
            project_key,
            repository_slug,
            from_branch,
            to_branch,
            title,
            description,
            reviewers: reviewers.unwrap_or_default(),
        };

        let created = self
            .client()
            .create_pull_request(&request)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&created)
    }
}

#[cfg(test)]
#[path = "pull_requests_test.rs"]
mod pull_requests_test;
