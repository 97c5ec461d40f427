//! Tests for user MCP tools

use crate::bitbucket::fake_server::{FakeBitbucket, api};
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::tool_text;
use crate::mcp::tools::users::*;
use axum::http::{Method, StatusCode};
use rmcp::{handler::server::wrapper::Parameters, model::ErrorCode};
use serde_json::{Value, json};

#[tokio::test(flavor = "multi_thread")]
async fn test_get_user_profile() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::GET,
        &api("/users/alice"),
        StatusCode::OK,
        json!({"name": "alice", "displayName": "Alice A", "slug": "alice", "active": true}),
    );
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_get_user_profile(Parameters(GetUserProfileParams {
            username: "alice".to_string(),
        }))
        .await
        .unwrap();
    assert!(result.is_error.is_none() || result.is_error == Some(false));

    let profile: Value = serde_json::from_str(&tool_text(&result)).unwrap();
    assert_eq!(profile["displayName"], "Alice A");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_user_profile_pretty_prints() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::GET,
        &api("/users/bob"),
        StatusCode::OK,
        json!({"name": "bob"}),
    );
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_get_user_profile(Parameters(GetUserProfileParams {
            username: "bob".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(tool_text(&result), "{\n  \"name\": \"bob\"\n}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_user_profile_unknown_user() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::GET,
        &api("/users/ghost"),
        StatusCode::NOT_FOUND,
        json!({"errors": [{"message": "User ghost does not exist."}]}),
    );
    let tools = BitbucketServer::new(server.client());

    let err = tools
        .bitbucket_get_user_profile(Parameters(GetUserProfileParams {
            username: "ghost".to_string(),
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(err.message, "Bitbucket Server API error: User ghost does not exist.");
    assert_eq!(err.data, Some(json!({"kind": "api_error", "status": 404})));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_user_profile_blank_username() {
    let server = FakeBitbucket::spawn().await;
    let tools = BitbucketServer::new(server.client());

    let err = tools
        .bitbucket_get_user_profile(Parameters(GetUserProfileParams {
            username: "".to_string(),
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(server.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_all_users_with_filter() {
    let server = FakeBitbucket::spawn().await;
    server.json(
        Method::GET,
        &api("/users"),
        StatusCode::OK,
        json!({"size": 1, "limit": 25, "isLastPage": true, "start": 0, "values": [{"name": "alice"}]}),
    );
    let tools = BitbucketServer::new(server.client());

    let result = tools
        .bitbucket_get_all_users(Parameters(GetAllUsersParams {
            filter: Some("ali".to_string()),
        }))
        .await
        .unwrap();

    let page: Value = serde_json::from_str(&tool_text(&result)).unwrap();
    assert_eq!(page["values"][0]["name"], "alice");
    assert_eq!(server.last_request().query.as_deref(), Some("filter=ali"));
}
