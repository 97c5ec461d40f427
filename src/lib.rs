pub mod bitbucket;
pub mod config;
pub mod mcp;
pub mod shaping;
