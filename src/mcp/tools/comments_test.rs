//! Tests for comment MCP tools

use crate::bitbucket::fake_server::{FakeBitbucket, api, likes};
use crate::bitbucket::models::{Emoticon, FileType, LineType};
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::comments::*;
use crate::mcp::tools::{PullRequestParams, tool_text};
use axum::http::{Method, StatusCode};
use rmcp::{handler::server::wrapper::Parameters, model::ErrorCode};
use serde_json::{Value, json};

const PR_PATH: &str = "/projects/PRJ/repos/backend/pull-requests/7";

fn pr() -> PullRequestParams {
    PullRequestParams {
        project_key: "PRJ".to_string(),
        repository_slug: "backend".to_string(),
        pull_request_id: 7,
    }
}

fn comments_path() -> String {
    api(&format!("{PR_PATH}/comments"))
}

fn serve_created_comment(server: &FakeBitbucket, id: u64) {
    server.json(
        Method::POST,
        &comments_path(),
        StatusCode::CREATED,
        json!({"id": id, "version": 0, "text": "created"}),
    );
}

fn add_params(text: &str) -> AddCommentParams {
    AddCommentParams {
        pull_request: pr(),
        text: text.to_string(),
        parent_id: None,
        path: None,
        line: None,
        line_type: None,
        file_type: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_general_comment() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 100);
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_add_pr_comment(Parameters(add_params("Looks good")))
        .await
        .unwrap();

    let created: Value = serde_json::from_str(&tool_text(&result)).unwrap();
    assert_eq!(created["id"], 100);
    assert_eq!(server.last_request().json(), json!({"text": "Looks good"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_reply_to_comment() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 101);
    let tools = BitbucketServer::new(server.client());

    let mut params = add_params("Agreed");
    params.parent_id = Some(100);
    tools
        .bitbucket_add_pr_comment(Parameters(params))
        .await
        .unwrap();

    assert_eq!(
        server.last_request().json(),
        json!({"text": "Agreed", "parent": {"id": 100}})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_comment_with_path_only_is_file_comment() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 102);
    let tools = BitbucketServer::new(server.client());

    let mut params = add_params("Split this file");
    params.path = Some("src/a.ts".to_string());
    tools
        .bitbucket_add_pr_comment(Parameters(params))
        .await
        .unwrap();

    assert_eq!(
        server.last_request().json()["anchor"],
        json!({"path": "src/a.ts", "diffType": "EFFECTIVE"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_comment_with_line_uses_defaults() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 103);
    let tools = BitbucketServer::new(server.client());

    let mut params = add_params("Off by one?");
    params.path = Some("src/a.ts".to_string());
    params.line = Some(10);
    tools
        .bitbucket_add_pr_comment(Parameters(params))
        .await
        .unwrap();

    assert_eq!(
        server.last_request().json()["anchor"],
        json!({"path": "src/a.ts", "diffType": "EFFECTIVE", "line": 10, "lineType": "CONTEXT", "fileType": "TO"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_comment_blank_text() {
    let server = FakeBitbucket::spawn().await;
    let tools = BitbucketServer::new(server.client());

    let err = tools
        .bitbucket_add_pr_comment(Parameters(add_params("   ")))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(server.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_file_comment_confirms_id() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 104);
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .add_pr_file_comment(Parameters(AddFileCommentParams {
            pull_request: pr(),
            text: "Needs a header".to_string(),
            path: "src/b.ts".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(
        tool_text(&result),
        "File comment added successfully. Comment ID: 104"
    );
    let anchor = server.last_request().json()["anchor"].clone();
    assert_eq!(anchor, json!({"path": "src/b.ts", "diffType": "EFFECTIVE"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_line_comment_confirms_id() {
    let server = FakeBitbucket::spawn().await;
    serve_created_comment(&server, 105);
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_add_pr_line_comment(Parameters(AddLineCommentParams {
            pull_request: pr(),
            text: "Was this removed on purpose?".to_string(),
            path: "src/b.ts".to_string(),
            line: 42,
            line_type: LineType::Removed,
            file_type: FileType::From,
        }))
        .await
        .unwrap();

    assert_eq!(
        tool_text(&result),
        "Line comment added successfully. Comment ID: 105"
    );
    assert_eq!(
        server.last_request().json()["anchor"],
        json!({"path": "src/b.ts", "diffType": "EFFECTIVE", "line": 42, "lineType": "REMOVED", "fileType": "FROM"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_line_comment_rejects_line_zero() {
    let server = FakeBitbucket::spawn().await;
    let tools = BitbucketServer::new(server.client());

    let err = tools
        .bitbucket_add_pr_line_comment(Parameters(AddLineCommentParams {
            pull_request: pr(),
            text: "here".to_string(),
            path: "src/b.ts".to_string(),
            line: 0,
            line_type: LineType::Added,
            file_type: FileType::To,
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(server.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_comment_confirms() {
    let server = FakeBitbucket::spawn().await;
    server.empty(
        Method::DELETE,
        &api(&format!("{PR_PATH}/comments/100")),
        StatusCode::NO_CONTENT,
    );
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .delete_pr_comment(Parameters(DeleteCommentParams {
            pull_request: pr(),
            comment_id: 100,
            version: 3,
        }))
        .await
        .unwrap();

    assert_eq!(tool_text(&result), "Comment 100 deleted successfully.");
    assert_eq!(server.last_request().query.as_deref(), Some("version=3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_comment_with_replies_is_rejected_upstream() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::DELETE,
        &api(&format!("{PR_PATH}/comments/100")),
        StatusCode::CONFLICT,
        json!({"errors": [{"message": "This comment has replies which must be deleted first."}]}),
    );
    let tools = BitbucketServer::new(server.client());

    let err = tools
        .delete_pr_comment(Parameters(DeleteCommentParams {
            pull_request: pr(),
            comment_id: 100,
            version: 3,
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("must be deleted first"));
    assert_eq!(err.data, Some(json!({"kind": "api_error", "status": 409})));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_reaction_confirms_with_user() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::PUT,
        &likes(&format!("{PR_PATH}/comments/100/reactions/heart")),
        StatusCode::OK,
        json!({
            "comment": {"id": 100},
            "emoticon": {"shortcut": "heart", "url": "https://bitbucket.example.com/heart.png"},
            "user": {"name": "alice", "displayName": "Alice A"}
        }),
    );
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_add_pr_comment_reaction(Parameters(CommentReactionParams {
            pull_request: pr(),
            comment_id: 100,
            emoticon: Emoticon::Heart,
        }))
        .await
        .unwrap();

    assert_eq!(
        tool_text(&result),
        "Reaction \"heart\" added successfully to comment 100 by Alice A."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remove_reaction_confirms() {
    let server = FakeBitbucket::spawn().await;
    let path = likes(&format!("{PR_PATH}/comments/100/reactions/thumbsdown"));
    server.empty(Method::DELETE, &path, StatusCode::NO_CONTENT);
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .remove_pr_comment_reaction(Parameters(CommentReactionParams {
            pull_request: pr(),
            comment_id: 100,
            emoticon: Emoticon::Thumbsdown,
        }))
        .await
        .unwrap();

    assert_eq!(
        tool_text(&result),
        "Reaction \"thumbsdown\" removed successfully from comment 100."
    );
    assert_eq!(server.requests_to(Method::DELETE, &path).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reaction_params_reject_unknown_emoticon() {
    let parsed = serde_json::from_value::<CommentReactionParams>(json!({
        "projectKey": "PRJ",
        "repositorySlug": "backend",
        "pullRequestId": 7,
        "commentId": 100,
        "emoticon": "rocket"
    }));
    assert!(parsed.is_err());
}
