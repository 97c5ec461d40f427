//! Bitbucket Server REST API: typed client, request/response shapes and errors.

pub mod client;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod fake_server;

pub use client::{BitbucketClient, DiffBody};
pub use error::{BitbucketError, BitbucketResult};
