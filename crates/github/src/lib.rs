//! GitHub REST boundary for the warden policy engine.
//!
//! This crate provides:
//! - `EventContext`: one incoming webhook delivery (event, action, payload)
//! - `RepoClient`: async trait over the repository calls the engine consumes
//! - `RestClient`: reqwest-backed implementation against the GitHub REST API
//! - `GithubError`: transport/API errors with a distinguished not-found condition

pub mod client;
pub mod error;
pub mod event;
pub mod rest;
pub mod types;

pub use client::RepoClient;
pub use error::{GithubError, Result};
pub use event::EventContext;
pub use rest::RestClient;
pub use types::*;
