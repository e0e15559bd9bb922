//! Collaborator traits through which the engine talks to GitHub.
//!
//! [`PullRequestHandler`] is scoped to a single pull request and is used by
//! the engine itself. [`RepoHandler`] is scoped to the head repository and
//! branch and is what individual checks see; it is object-safe so that checks
//! can be stored as trait objects in the registry.
//!
//! Implementations:
//! - [`crate::github::GitHubPullRequestHandler`] (octocrab)
//! - the recording mocks in `test_utils`

use std::future::Future;

use async_trait::async_trait;

use crate::config::Config;
use crate::types::{RepoId, Sha};

use super::CheckRunUpdate;

/// Error type returned across the object-safe [`RepoHandler`] boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pull request metadata fetched once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Label names, in the order GitHub reports them.
    pub labels: Vec<String>,

    pub is_closed: bool,

    /// The repository the PR's head branch lives in (a fork, possibly).
    pub head_repo: RepoId,

    pub head_branch: String,

    pub head_sha: Sha,
}

/// Operations on one pull request.
pub trait PullRequestHandler: Sync {
    /// The error type returned by this handler.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The repository handler given to checks.
    type Repo: RepoHandler + 'static;

    /// Fetches the pull request's labels, state and head.
    fn pull_request(&self) -> impl Future<Output = Result<PullRequestInfo, Self::Error>> + Send;

    /// Fetches the effective configuration for the pull request's repository.
    fn config(&self) -> impl Future<Output = Result<Config, Self::Error>> + Send;

    /// Lists the names of the check runs on the head commit.
    fn list_checks(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Creates a check run on the head commit.
    fn set_check(
        &self,
        update: CheckRunUpdate,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Posts a comment on the pull request.
    fn submit_comment(&self, body: String)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Creates a handler for the head repository and branch.
    fn repo_handler(&self, info: &PullRequestInfo) -> Self::Repo;
}

/// Read access to a repository at a fixed branch.
#[async_trait]
pub trait RepoHandler: Send + Sync {
    /// The repository.
    fn repo(&self) -> &RepoId;

    /// The branch files are read from.
    fn branch(&self) -> &str;

    /// Returns the text of `path`, or `None` if it does not exist.
    async fn file_contents(&self, path: &str) -> Result<Option<String>, BoxError>;
}
