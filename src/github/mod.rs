//! GitHub implementations of the engine's collaborator traits.
//!
//! Everything goes through octocrab with token authentication. Check runs are
//! created through the REST check-runs routes, and repository files are read
//! through the contents API.

mod client;
mod error;
mod handler;

pub use client::OctocrabClient;
pub use error::GitHubApiError;
pub use handler::{GitHubPullRequestHandler, GitHubRepoHandler, REPO_CONFIG_FILE};
