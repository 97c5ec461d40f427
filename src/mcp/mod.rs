//! Model Context Protocol (MCP) server
//!
//! - **server**: [`BitbucketServer`], the tool registry
//! - **tools**: tool groups (users, projects, repos, pull requests, comments, reviews)
//! - **service**: Streamable HTTP service for the `http` transport
//!
//! [`run`] serves one of two transports: stdio (the default, one client on
//! stdin/stdout) or Streamable HTTP mounted at `/mcp`.

pub mod server;
mod service;
pub mod tools;


use std::sync::Arc;

use axum::Router;
use miette::Diagnostic;
use rmcp::ServiceExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::bitbucket::BitbucketClient;
use crate::config::{ServeConfig, Transport};

pub use server::BitbucketServer;
pub use service::create_mcp_service;

#[derive(Error, Diagnostic, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(bitbucket_mcp::serve::bind),
        help("Pick another --port or stop the process using it.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    #[diagnostic(code(bitbucket_mcp::serve::http))]
    Http(#[source] std::io::Error),

    #[error("MCP session failed: {message}")]
    #[diagnostic(code(bitbucket_mcp::serve::session))]
    Session { message: String },
}

/// Initialize tracing with an env filter.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
pub fn init_tracing(config: &ServeConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Serve the Bitbucket tools until the client disconnects or, for HTTP,
/// until Ctrl-C.
pub async fn run(config: ServeConfig, client: BitbucketClient) -> Result<(), ServeError> {
    let client = Arc::new(client);
    info!(upstream = %client.base_url(), transport = ?config.transport, "starting MCP server");

    match config.transport {
        Transport::Stdio => serve_stdio(client).await,
        Transport::Http => serve_http(&config, client).await,
    }
}

async fn serve_stdio(client: Arc<BitbucketClient>) -> Result<(), ServeError> {
    let service = BitbucketServer::new(client)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServeError::Session {
            message: e.to_string(),
        })?;

    let reason = service.waiting().await.map_err(|e| ServeError::Session {
        message: e.to_string(),
    })?;
    info!(?reason, "MCP session ended");
    Ok(())
}

async fn serve_http(config: &ServeConfig, client: Arc<BitbucketClient>) -> Result<(), ServeError> {
    let ct = CancellationToken::new();
    let app = Router::new()
        .nest_service("/mcp", create_mcp_service(client, ct.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            ct.cancel();
        })
        .await
        .map_err(ServeError::Http)
}
