//! Bitbucket MCP server binary.
//!
//! Reads the upstream connection from the environment (or `.env`), builds the
//! one shared API client and serves the tools over the selected transport.

use std::net::IpAddr;

use bitbucket_mcp::bitbucket::{BitbucketClient, BitbucketError};
use bitbucket_mcp::config::{BitbucketConfig, ConfigError, ServeConfig, Transport};
use bitbucket_mcp::mcp::{self, ServeError};
use clap::Parser;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create Bitbucket client: {0}")]
    #[diagnostic(code(bitbucket_mcp::binary::client))]
    Client(#[from] BitbucketError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serve(#[from] ServeError),
}

#[derive(Parser)]
#[command(name = "bitbucket-mcp")]
#[command(author, version, about = "MCP server for Bitbucket Server pull requests", long_about = None)]
struct Cli {
    /// Transport to serve the MCP protocol over
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Host address to bind to (http transport)
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on (http transport)
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let serve = ServeConfig {
        transport: cli.transport,
        host: cli.host,
        port: cli.port,
        verbosity: cli.verbose,
    };
    mcp::init_tracing(&serve);

    run(serve).await.map_err(Into::into)
}

async fn run(serve: ServeConfig) -> Result<(), BinaryError> {
    let config = BitbucketConfig::from_env()?;
    let client = BitbucketClient::new(config)?;
    mcp::run(serve, client).await?;
    Ok(())
}
