//! The contract individual pull request checks implement.
//!
//! A check inspects a [`PullRequestContext`] (and, through a [`RepoHandler`],
//! the head branch's files) and returns either `None` ("not applicable this
//! run") or a set of named [`CheckResult`]s. Each name becomes its own check
//! run, `<bot_name>:<name>`, on the pull request's head commit.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::effects::{BoxError, PullRequestInfo, RepoHandler};
use crate::types::{PrNumber, RepoId, Sha};

pub mod builtin;
pub mod registry;

pub use registry::{CheckRegistry, CheckRegistryBuilder, RegisteredCheck};

/// The verdict of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Success,
    Failure,
    Error,
    Pending,
}

/// A named check outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub state: CheckState,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl CheckResult {
    pub fn new(state: CheckState, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
            target_url: None,
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new(CheckState::Success, description)
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self::new(CheckState::Failure, description)
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }
}

/// Results keyed by check name, ordered by name.
pub type CheckResults = BTreeMap<String, CheckResult>;

/// Folds `incoming` into `results`; on a name collision the incoming result wins.
pub fn merge_results(results: &mut CheckResults, incoming: CheckResults) {
    results.extend(incoming);
}

/// Errors a check can fail with.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Reading from the head repository failed.
    #[error("repository access failed: {0}")]
    Repository(#[source] BoxError),

    /// The check could not produce a verdict.
    #[error("{0}")]
    Failed(String),
}

/// Everything a check may look at for the pull request under test.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    repo: RepoId,
    number: PrNumber,
    info: PullRequestInfo,
    config: Config,
}

impl PullRequestContext {
    pub fn new(repo: RepoId, number: PrNumber, info: PullRequestInfo, config: Config) -> Self {
        Self {
            repo,
            number,
            info,
            config,
        }
    }

    /// The repository the pull request was opened against.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn number(&self) -> PrNumber {
        self.number
    }

    /// Label names, in the order GitHub reports them.
    pub fn labels(&self) -> &[String] {
        &self.info.labels
    }

    pub fn is_closed(&self) -> bool {
        self.info.is_closed
    }

    pub fn head_repo_name(&self) -> &RepoId {
        &self.info.head_repo
    }

    pub fn head_branch(&self) -> &str {
        &self.info.head_branch
    }

    pub fn head_sha(&self) -> &Sha {
        &self.info.head_sha
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Looks up a repository configuration value, falling back to `default`.
    pub fn get_config_value<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.config.get_config_value(key, default)
    }
}

/// A pull request check.
///
/// The registry identifies checks by [`Check::name`]; registering a second
/// check under the same name replaces the first.
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable identity of this check.
    fn name(&self) -> &str;

    /// Runs the check. `Ok(None)` means the check does not apply this run.
    async fn run(
        &self,
        pr: &PullRequestContext,
        repo: &dyn RepoHandler,
    ) -> Result<Option<CheckResults>, CheckError>;
}

/// Adapts a synchronous function over the pull request context into a [`Check`].
pub struct FnCheck<F> {
    name: String,
    f: F,
}

impl<F> FnCheck<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&PullRequestContext) -> Result<Option<CheckResults>, CheckError> + Send + Sync,
    {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnCheck<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Check for FnCheck<F>
where
    F: Fn(&PullRequestContext) -> Result<Option<CheckResults>, CheckError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        pr: &PullRequestContext,
        _repo: &dyn RepoHandler,
    ) -> Result<Option<CheckResults>, CheckError> {
        (self.f)(pr)
    }
}
