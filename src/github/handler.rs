//! Octocrab-backed implementations of the pull request and repository handlers.
//!
//! Routes used:
//! - `GET /repos/{o}/{r}/pulls/{n}` (labels, state, head)
//! - `GET /repos/{o}/{r}/commits/{sha}/check-runs` (existing check names)
//! - `POST /repos/{o}/{r}/check-runs` (one run per update)
//! - `POST /repos/{o}/{r}/issues/{n}/comments`
//! - `GET /repos/{o}/{r}/contents/{path}` (configuration and check inputs)

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use octocrab::models::IssueState;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::effects::{
    BoxError, CheckConclusion, CheckRunUpdate, PullRequestHandler, PullRequestInfo, RepoHandler,
};
use crate::types::{PrNumber, RepoId, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// File holding per-repository configuration.
pub const REPO_CONFIG_FILE: &str = "pyproject.toml";

const CHECK_RUNS_PER_PAGE: usize = 100;

/// Handler for one pull request.
///
/// Pull request metadata is fetched at most once per handler, which lives for
/// one webhook delivery.
#[derive(Debug)]
pub struct GitHubPullRequestHandler {
    client: OctocrabClient,
    number: PrNumber,
    bot_name: String,
    global_config: Arc<Config>,
    info: OnceCell<PullRequestInfo>,
}

impl GitHubPullRequestHandler {
    pub fn new(
        client: OctocrabClient,
        number: PrNumber,
        bot_name: impl Into<String>,
        global_config: Arc<Config>,
    ) -> Self {
        Self {
            client,
            number,
            bot_name: bot_name.into(),
            global_config,
            info: OnceCell::new(),
        }
    }

    async fn info(&self) -> Result<&PullRequestInfo, GitHubApiError> {
        self.info
            .get_or_try_init(|| fetch_pull_request(&self.client, self.number))
            .await
    }
}

impl PullRequestHandler for GitHubPullRequestHandler {
    type Error = GitHubApiError;
    type Repo = GitHubRepoHandler;

    async fn pull_request(&self) -> Result<PullRequestInfo, GitHubApiError> {
        self.info().await.cloned()
    }

    async fn config(&self) -> Result<Config, GitHubApiError> {
        let text = fetch_file(&self.client, REPO_CONFIG_FILE, None).await?;
        Ok(merge_repo_config(
            &self.global_config,
            text.as_deref(),
            &self.bot_name,
        ))
    }

    async fn list_checks(&self) -> Result<Vec<String>, GitHubApiError> {
        let head_sha = self.info().await?.head_sha.clone();
        list_check_runs(&self.client, &head_sha).await
    }

    async fn set_check(&self, update: CheckRunUpdate) -> Result<(), GitHubApiError> {
        let head_sha = self.info().await?.head_sha.clone();
        let request = CreateCheckRun::new(&head_sha, &update, Utc::now());
        let route = self.client.route("check-runs");

        debug!(name = %update.name, conclusion = ?update.conclusion, "Creating check run");

        let _: CheckRunResponse = self
            .client
            .inner()
            .post(route, Some(&request))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    async fn submit_comment(&self, body: String) -> Result<(), GitHubApiError> {
        self.client
            .inner()
            .issues(self.client.owner(), self.client.repo_name())
            .create_comment(self.number.0, body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    fn repo_handler(&self, info: &PullRequestInfo) -> GitHubRepoHandler {
        GitHubRepoHandler {
            client: self.client.for_repo(info.head_repo.clone()),
            branch: info.head_branch.clone(),
        }
    }
}

/// Read access to one branch of a repository.
#[derive(Debug, Clone)]
pub struct GitHubRepoHandler {
    client: OctocrabClient,
    branch: String,
}

#[async_trait]
impl RepoHandler for GitHubRepoHandler {
    fn repo(&self) -> &RepoId {
        self.client.repo()
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    async fn file_contents(&self, path: &str) -> Result<Option<String>, BoxError> {
        Ok(fetch_file(&self.client, path, Some(&self.branch)).await?)
    }
}

async fn fetch_pull_request(
    client: &OctocrabClient,
    number: PrNumber,
) -> Result<PullRequestInfo, GitHubApiError> {
    let pull = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .get(number.0)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let labels = pull
        .labels
        .unwrap_or_default()
        .into_iter()
        .map(|label| label.name)
        .collect();

    // A deleted fork reports no head repository; fall back to the base.
    let head_repo = pull
        .head
        .repo
        .as_ref()
        .and_then(|repo| repo.full_name.as_deref())
        .and_then(RepoId::parse_full_name)
        .unwrap_or_else(|| client.repo().clone());

    Ok(PullRequestInfo {
        labels,
        is_closed: pull.state == Some(IssueState::Closed),
        head_repo,
        head_branch: pull.head.ref_field.clone(),
        head_sha: Sha::new(pull.head.sha.clone()),
    })
}

#[derive(Debug, Deserialize)]
struct CheckRunList {
    total_count: usize,
    check_runs: Vec<CheckRunResponse>,
}

#[derive(Debug, Deserialize)]
struct CheckRunResponse {
    name: String,
}

async fn list_check_runs(
    client: &OctocrabClient,
    head_sha: &Sha,
) -> Result<Vec<String>, GitHubApiError> {
    let mut page = 1u32;
    let mut names = Vec::new();

    loop {
        let route = client.route(&format!(
            "commits/{}/check-runs?per_page={}&page={}",
            head_sha, CHECK_RUNS_PER_PAGE, page
        ));
        let list: CheckRunList = client
            .inner()
            .get(route, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let fetched = list.check_runs.len();
        names.extend(list.check_runs.into_iter().map(|run| run.name));

        if fetched < CHECK_RUNS_PER_PAGE || names.len() >= list.total_count {
            break;
        }
        page += 1;
    }

    debug!(sha = %head_sha.short(), count = names.len(), "Listed check runs");
    Ok(names)
}

/// Body of `POST /repos/{o}/{r}/check-runs`.
#[derive(Debug, Serialize)]
struct CreateCheckRun<'a> {
    name: &'a str,
    head_sha: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details_url: Option<&'a str>,
    output: CheckRunOutput<'a>,
}

#[derive(Debug, Serialize)]
struct CheckRunOutput<'a> {
    title: &'a str,
    summary: &'a str,
}

impl<'a> CreateCheckRun<'a> {
    /// Builds the request for `update`.
    ///
    /// GitHub has no "pending" conclusion; such runs are created in progress.
    fn new(head_sha: &'a Sha, update: &'a CheckRunUpdate, now: DateTime<Utc>) -> Self {
        let (status, conclusion, completed_at) = match update.conclusion {
            CheckConclusion::Pending => ("in_progress", None, None),
            conclusion => ("completed", Some(conclusion.as_api_str()), Some(now)),
        };

        Self {
            name: &update.name,
            head_sha: head_sha.as_str(),
            status,
            conclusion,
            completed_at,
            details_url: update.details_url.as_deref(),
            output: CheckRunOutput {
                title: &update.name,
                summary: &update.summary,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Fetches a file's text; `None` if it does not exist.
async fn fetch_file(
    client: &OctocrabClient,
    path: &str,
    git_ref: Option<&str>,
) -> Result<Option<String>, GitHubApiError> {
    let encoded_path = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let mut route = client.route(&format!("contents/{encoded_path}"));
    if let Some(git_ref) = git_ref {
        route.push_str(&format!("?ref={}", urlencoding::encode(git_ref)));
    }

    let result: Result<ContentsResponse, _> = client.inner().get(&route, None::<&()>).await;
    match result {
        Ok(response) => decode_contents(response).map(Some),
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                debug!(repo = %client.repo(), path, "File not found");
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

fn decode_contents(response: ContentsResponse) -> Result<String, GitHubApiError> {
    match response.encoding.as_deref() {
        Some("base64") | None => {}
        Some(other) => {
            return Err(GitHubApiError::without_source(format!(
                "Unsupported content encoding '{other}'"
            )));
        }
    }

    let packed: String = response
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(packed)
        .map_err(|e| GitHubApiError::without_source(format!("Invalid base64: {e}")))?;

    String::from_utf8(bytes)
        .map_err(|e| GitHubApiError::without_source(format!("File is not UTF-8: {e}")))
}

/// Layers the repository's `[tool.<bot_name>]` table over the global config.
///
/// A missing file or table leaves the global config untouched. A file that
/// fails to parse is logged and ignored.
fn merge_repo_config(global: &Config, repo_text: Option<&str>, bot_name: &str) -> Config {
    let mut config = global.clone();

    let Some(text) = repo_text else {
        debug!("No repository config file");
        return config;
    };

    match Config::loads(text, bot_name) {
        Ok(repo) => config.update(repo),
        Err(ConfigError::MissingTool(tool)) => {
            debug!(tool = %tool, "Repository config has no table for this bot");
        }
        Err(e) => warn!(error = %e, "Ignoring invalid repository config"),
    }

    config
}
