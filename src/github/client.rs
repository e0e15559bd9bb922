//! Octocrab client wrapper scoped to a specific repository.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to one repository.
///
/// Cloning is cheap; the underlying `Octocrab` shares its HTTP client.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates an unscoped octocrab instance authenticated with a token.
    pub fn build_with_token(token: impl Into<String>) -> Result<Octocrab, octocrab::Error> {
        Octocrab::builder().personal_token(token.into()).build()
    }

    /// Returns the same client scoped to another repository.
    pub fn for_repo(&self, repo: RepoId) -> Self {
        Self::new(self.client.clone(), repo)
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Builds a `/repos/{owner}/{repo}/...` route.
    pub fn route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner(), self.repo_name(), tail)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
