//! Effects-as-data for the GitHub mutations the engine performs.
//!
//! The skip gate, the remark side channel and reconciliation all describe what
//! to post as [`CheckEffect`] values. The engine hands them to a
//! [`PullRequestHandler`] via [`apply_effect`], which keeps the decision logic
//! pure and lets tests inspect exactly what would have been posted.

use serde::{Deserialize, Serialize};

pub mod handler;

pub use handler::{BoxError, PullRequestHandler, PullRequestInfo, RepoHandler};

use crate::checks::CheckState;

/// The conclusion of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Error,
    /// Intentionally not evaluated; used for skipped checks.
    Neutral,
    Pending,
}

impl CheckConclusion {
    /// Returns the API spelling of this conclusion.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CheckConclusion::Success => "success",
            CheckConclusion::Failure => "failure",
            CheckConclusion::Error => "error",
            CheckConclusion::Neutral => "neutral",
            CheckConclusion::Pending => "pending",
        }
    }
}

impl From<CheckState> for CheckConclusion {
    fn from(state: CheckState) -> Self {
        match state {
            CheckState::Success => CheckConclusion::Success,
            CheckState::Failure => CheckConclusion::Failure,
            CheckState::Error => CheckConclusion::Error,
            CheckState::Pending => CheckConclusion::Pending,
        }
    }
}

/// The status of a check run. The engine only ever posts completed runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Completed,
}

/// A check run to create on the pull request's head commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunUpdate {
    /// Full check name, `<bot_name>:<check>` or the bare bot name.
    pub name: String,

    /// Summary text shown with the check.
    pub summary: String,

    /// Optional link for "Details".
    pub details_url: Option<String>,

    pub status: CheckRunStatus,

    pub conclusion: CheckConclusion,
}

impl CheckRunUpdate {
    /// Creates a completed check run without a details link.
    pub fn completed(
        name: impl Into<String>,
        summary: impl Into<String>,
        conclusion: CheckConclusion,
    ) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            details_url: None,
            status: CheckRunStatus::Completed,
            conclusion,
        }
    }

    /// Sets the details link.
    pub fn with_details_url(mut self, url: Option<String>) -> Self {
        self.details_url = url;
        self
    }
}

/// A mutation to perform through the pull request handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect_type", rename_all = "snake_case")]
pub enum CheckEffect {
    /// Create a check run on the head commit.
    SetCheck(CheckRunUpdate),

    /// Post a comment on the pull request.
    PostComment { body: String },
}

/// Executes one effect through the handler.
pub async fn apply_effect<H: PullRequestHandler>(
    handler: &H,
    effect: CheckEffect,
) -> Result<(), H::Error> {
    match effect {
        CheckEffect::SetCheck(update) => handler.set_check(update).await,
        CheckEffect::PostComment { body } => handler.submit_comment(body).await,
    }
}
