//! Shared test utilities: recording mock handlers, check helpers and
//! arbitrary generators for property-based testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proptest::prelude::*;

use crate::checks::{Check, CheckError, CheckResult, CheckResults, PullRequestContext};
use crate::config::Config;
use crate::effects::{
    BoxError, CheckRunUpdate, PullRequestHandler, PullRequestInfo, RepoHandler,
};
use crate::types::{PrNumber, RepoId, Sha};

pub const TEST_BOT: &str = "testbot";

pub fn arb_label() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z -]{0,15}".prop_map(String::from)
}

pub fn arb_labels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_label(), 0..5)
}

/// Builds a `CheckResults` map from literal pairs.
pub fn results(pairs: &[(&str, CheckResult)]) -> CheckResults {
    pairs
        .iter()
        .map(|(name, result)| (name.to_string(), result.clone()))
        .collect()
}

/// An open pull request from a fork, carrying `labels`.
pub fn open_pr_info(labels: &[&str]) -> PullRequestInfo {
    PullRequestInfo {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        is_closed: false,
        head_repo: RepoId::new("contributor", "test"),
        head_branch: "custom".to_string(),
        head_sha: Sha::from("abc464aa"),
    }
}

/// A check context for PR #1234 on `test/repo`.
pub fn context(labels: &[&str], config: Config) -> PullRequestContext {
    PullRequestContext::new(
        RepoId::new("test", "repo"),
        PrNumber(1234),
        open_pr_info(labels),
        config,
    )
}

/// Loads a `[tool.testbot]` configuration from TOML text.
pub fn bot_config(text: &str) -> Config {
    Config::loads(text, TEST_BOT).expect("test config should parse")
}

#[derive(Debug, thiserror::Error)]
#[error("mock failure: {0}")]
pub struct MockError(pub String);

/// In-memory repository contents.
#[derive(Debug, Clone)]
pub struct MockRepo {
    repo: RepoId,
    branch: String,
    files: HashMap<String, String>,
    failing: bool,
}

impl Default for MockRepo {
    fn default() -> Self {
        Self {
            repo: RepoId::new("contributor", "test"),
            branch: "custom".to_string(),
            files: HashMap::new(),
            failing: false,
        }
    }
}

impl MockRepo {
    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    /// Makes every file read fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

#[async_trait]
impl RepoHandler for MockRepo {
    fn repo(&self) -> &RepoId {
        &self.repo
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    async fn file_contents(&self, path: &str) -> Result<Option<String>, BoxError> {
        if self.failing {
            return Err(Box::new(MockError(format!("cannot read {path}"))));
        }
        Ok(self.files.get(path).cloned())
    }
}

/// A pull request handler that records every mutation.
#[derive(Debug)]
pub struct MockPullRequestHandler {
    info: PullRequestInfo,
    config: Config,
    existing_checks: Vec<String>,
    repo: MockRepo,
    fail_list_checks: bool,
    posted: Mutex<Vec<CheckRunUpdate>>,
    comments: Mutex<Vec<String>>,
}

impl MockPullRequestHandler {
    pub fn new(info: PullRequestInfo, config: Config) -> Self {
        Self {
            info,
            config,
            existing_checks: Vec::new(),
            repo: MockRepo::default(),
            fail_list_checks: false,
            posted: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
        }
    }

    pub fn with_existing_checks(mut self, names: &[&str]) -> Self {
        self.existing_checks = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_repo(mut self, repo: MockRepo) -> Self {
        self.repo = repo;
        self
    }

    pub fn failing_list_checks(mut self) -> Self {
        self.fail_list_checks = true;
        self
    }

    /// Check runs posted so far, in order.
    pub fn posted(&self) -> Vec<CheckRunUpdate> {
        self.posted.lock().expect("poisoned").clone()
    }

    /// Comments posted so far, in order.
    pub fn comments(&self) -> Vec<String> {
        self.comments.lock().expect("poisoned").clone()
    }
}

impl PullRequestHandler for MockPullRequestHandler {
    type Error = MockError;
    type Repo = MockRepo;

    async fn pull_request(&self) -> Result<PullRequestInfo, MockError> {
        Ok(self.info.clone())
    }

    async fn config(&self) -> Result<Config, MockError> {
        Ok(self.config.clone())
    }

    async fn list_checks(&self) -> Result<Vec<String>, MockError> {
        if self.fail_list_checks {
            return Err(MockError("list_checks".to_string()));
        }
        Ok(self.existing_checks.clone())
    }

    async fn set_check(&self, update: CheckRunUpdate) -> Result<(), MockError> {
        self.posted.lock().expect("poisoned").push(update);
        Ok(())
    }

    async fn submit_comment(&self, body: String) -> Result<(), MockError> {
        self.comments.lock().expect("poisoned").push(body);
        Ok(())
    }

    fn repo_handler(&self, _info: &PullRequestInfo) -> MockRepo {
        self.repo.clone()
    }
}

/// A check that counts its invocations and produces one success result.
#[derive(Debug, Clone)]
pub struct CountingCheck {
    name: String,
    calls: Arc<AtomicUsize>,
}

impl CountingCheck {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Check for CountingCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _pr: &PullRequestContext,
        _repo: &dyn RepoHandler,
    ) -> Result<Option<CheckResults>, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(results(&[(self.name.as_str(), CheckResult::success("ran"))])))
    }
}
