//! Comment and reaction tools

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bitbucket::models::{Emoticon, FileType, LineType, NewComment};
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::{PullRequestParams, json_result, map_bitbucket_error, text_result};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Comment text (markdown)")]
    pub text: String,
    #[schemars(description = "ID of the comment to reply to")]
    pub parent_id: Option<u64>,
    #[schemars(description = "File path to attach the comment to; omit for a general comment")]
    pub path: Option<String>,
    #[schemars(description = "Line number for an inline comment; needs path")]
    pub line: Option<u32>,
    #[schemars(description = "ADDED, REMOVED or CONTEXT (default: CONTEXT)")]
    pub line_type: Option<LineType>,
    #[schemars(description = "FROM (old side) or TO (new side) of the diff (default: TO)")]
    pub file_type: Option<FileType>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFileCommentParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Comment text (markdown)")]
    pub text: String,
    #[schemars(description = "File path to attach the comment to, e.g. src/main.rs")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLineCommentParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Comment text (markdown)")]
    pub text: String,
    #[schemars(description = "File path, e.g. src/main.rs")]
    pub path: String,
    #[schemars(description = "Line number to comment on (destination line number from the diff)")]
    pub line: u32,
    #[schemars(description = "ADDED (+), REMOVED (-) or CONTEXT (unchanged)")]
    pub line_type: LineType,
    #[schemars(description = "FROM (old side) or TO (new side) of the diff")]
    pub file_type: FileType,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "ID of the comment to delete")]
    pub comment_id: u64,
    #[schemars(description = "Version of the comment as last read; stale versions are rejected")]
    pub version: u32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentReactionParams {
    #[serde(flatten)]
    pub pull_request: PullRequestParams,
    #[schemars(description = "Comment ID")]
    pub comment_id: u64,
    #[schemars(description = "thumbsup, thumbsdown, heart, thinking_face or laughing")]
    pub emoticon: Emoticon,
}

#[tool_router(router = comment_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "Add a comment to a pull request: a general comment, a reply (parentId), a file comment (path) or a line comment (path + line).")]
    pub async fn bitbucket_add_pr_comment(
        &self,
        params: Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddCommentParams {
            pull_request,
            text,
            parent_id,
            path,
            line,
            line_type,
            file_type,
        } = params.0;
        let comment = NewComment {
            text,
            parent_id,
            path,
            line,
            line_type,
            file_type,
        };

        let created = self
            .client()
            .add_pull_request_comment(&pull_request.key(), &comment.into_body())
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&created)
    }

    #[tool(description = "Add a comment on a whole file of a pull request.")]
    pub async fn add_pr_file_comment(
        &self,
        params: Parameters<AddFileCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let comment = NewComment {
            text: params.0.text,
            path: Some(params.0.path),
            ..Default::default()
        };

        let created = self
            .client()
            .add_pull_request_comment(&params.0.pull_request.key(), &comment.into_body())
            .await
            .map_err(map_bitbucket_error)?;
        Ok(text_result(format!(
            "File comment added successfully. Comment ID: {}",
            comment_id(&created)
        )))
    }

    #[tool(description = "Add an inline comment on one line of a file in a pull request. Get line numbers from bitbucket_get_pull_request_file_diff.")]
    pub async fn bitbucket_add_pr_line_comment(
        &self,
        params: Parameters<AddLineCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddLineCommentParams {
            pull_request,
            text,
            path,
            line,
            line_type,
            file_type,
        } = params.0;
        let comment = NewComment {
            text,
            parent_id: None,
            path: Some(path),
            line: Some(line),
            line_type: Some(line_type),
            file_type: Some(file_type),
        };

        let created = self
            .client()
            .add_pull_request_comment(&pull_request.key(), &comment.into_body())
            .await
            .map_err(map_bitbucket_error)?;
        Ok(text_result(format!(
            "Line comment added successfully. Comment ID: {}",
            comment_id(&created)
        )))
    }

    #[tool(description = "Delete a pull request comment. Requires the comment's current version; comments with replies cannot be deleted.")]
    pub async fn delete_pr_comment(
        &self,
        params: Parameters<DeleteCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        self.client()
            .delete_pull_request_comment(
                &params.0.pull_request.key(),
                params.0.comment_id,
                params.0.version,
            )
            .await
            .map_err(map_bitbucket_error)?;
        Ok(text_result(format!(
            "Comment {} deleted successfully.",
            params.0.comment_id
        )))
    }

    #[tool(description = "React to a pull request comment with an emoticon.")]
    pub async fn bitbucket_add_pr_comment_reaction(
        &self,
        params: Parameters<CommentReactionParams>,
    ) -> Result<CallToolResult, McpError> {
        let CommentReactionParams {
            pull_request,
            comment_id,
            emoticon,
        } = params.0;

        let reaction = self
            .client()
            .add_comment_reaction(&pull_request.key(), comment_id, emoticon)
            .await
            .map_err(map_bitbucket_error)?;

        let shortcut = reaction
            .pointer("/emoticon/shortcut")
            .and_then(Value::as_str)
            .unwrap_or(emoticon.as_str());
        let by = reaction
            .pointer("/user/displayName")
            .and_then(Value::as_str)
            .unwrap_or("unknown user");
        Ok(text_result(format!(
            "Reaction \"{shortcut}\" added successfully to comment {comment_id} by {by}."
        )))
    }

    #[tool(description = "Remove the caller's emoticon reaction from a pull request comment.")]
    pub async fn remove_pr_comment_reaction(
        &self,
        params: Parameters<CommentReactionParams>,
    ) -> Result<CallToolResult, McpError> {
        let CommentReactionParams {
            pull_request,
            comment_id,
            emoticon,
        } = params.0;

        self.client()
            .remove_comment_reaction(&pull_request.key(), comment_id, emoticon)
            .await
            .map_err(map_bitbucket_error)?;
        Ok(text_result(format!(
            "Reaction \"{}\" removed successfully from comment {comment_id}.",
            emoticon.as_str()
        )))
    }
}

fn comment_id(created: &Value) -> String {
    match created.get("id") {
        Some(Value::Number(id)) => id.to_string(),
        Some(Value::String(id)) => id.clone(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod comments_test;
