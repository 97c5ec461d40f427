//! MCP Streamable HTTP service creation

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::bitbucket::BitbucketClient;

use super::server::BitbucketServer;

/// Create the MCP Streamable HTTP service
///
/// The returned service can be nested into an Axum router:
///
/// ```no_run
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use bitbucket_mcp::bitbucket::BitbucketClient;
/// # use bitbucket_mcp::config::BitbucketConfig;
/// # use bitbucket_mcp::mcp::create_mcp_service;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BitbucketConfig::new("https://bitbucket.example.com", "token")?;
/// let client = BitbucketClient::new(config)?;
///
/// let ct = CancellationToken::new();
/// let app: Router = Router::new().nest_service("/mcp", create_mcp_service(client, ct));
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service(
    client: impl Into<Arc<BitbucketClient>>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<BitbucketServer, LocalSessionManager> {
    let client = client.into();

    // One server per session, all sharing the client
    let service_factory = move || -> Result<BitbucketServer, std::io::Error> {
        Ok(BitbucketServer::new(Arc::clone(&client)))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
