//! Project tools

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::bitbucket::models::ProjectQuery;
use crate::mcp::server::BitbucketServer;
use crate::mcp::tools::{json_result, map_bitbucket_error};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    #[schemars(description = "Filter projects by name (partial match)")]
    pub name: Option<String>,
    #[schemars(description = "Only projects where the caller holds this permission, e.g. PROJECT_READ, PROJECT_WRITE, PROJECT_ADMIN")]
    pub permission: Option<String>,
    #[schemars(description = "Index of the first project to return (default: 0)")]
    pub start: Option<u32>,
    #[schemars(description = "Page size (server default: 25)")]
    pub limit: Option<u32>,
}

#[tool_router(router = project_tools, vis = "pub(crate)")]
impl BitbucketServer {
    #[tool(description = "List projects visible to the caller. Pass start/limit to page; a response without nextPageStart is the last page.")]
    pub async fn bitbucket_list_projects(
        &self,
        params: Parameters<ListProjectsParams>,
    ) -> Result<CallToolResult, McpError> {
        let ListProjectsParams {
            name,
            permission,
            start,
            limit,
        } = params.0;
        let query = ProjectQuery {
            name,
            permission,
            start,
            limit,
        };

        let page = self
            .client()
            .list_projects(&query)
            .await
            .map_err(map_bitbucket_error)?;
        json_result(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitbucket::fake_server::{FakeBitbucket, api};
    use crate::mcp::tools::tool_text;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_projects_returns_page_verbatim() {
        let server = FakeBitbucket::spawn().await;
        let upstream = json!({
            "size": 1, "limit": 1, "isLastPage": false, "start": 0, "nextPageStart": 1,
            "values": [{"key": "PRJ", "id": 1, "name": "Project", "type": "NORMAL"}]
        });
        server.json(Method::GET, &api("/projects"), StatusCode::OK, upstream.clone());
        let tools = BitbucketServer::new(server.client());

        let result = tools
            .bitbucket_list_projects(Parameters(ListProjectsParams {
                name: Some("Proj".to_string()),
                limit: Some(1),
                ..Default::default()
            }))
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&tool_text(&result)).unwrap();
        assert_eq!(body, upstream);
        assert_eq!(
            server.last_request().query.as_deref(),
            Some("name=Proj&limit=1")
        );
    }

    #[tokio::test]
    async fn test_list_projects_rejects_zero_limit() {
        let server = FakeBitbucket::spawn().await;
        let tools = BitbucketServer::new(server.client());

        let err = tools
            .bitbucket_list_projects(Parameters(ListProjectsParams {
                limit: Some(0),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(server.requests().is_empty());
    }
}
