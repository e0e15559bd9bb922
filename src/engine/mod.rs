//! The check orchestration engine.
//!
//! [`process_pull_request`] runs one eligible event against one pull request:
//!
//! 1. disabled configuration and closed pull requests short-circuit;
//! 2. the skip gate may stop the run (optionally posting a failing check);
//! 3. registered checks run and their results are merged;
//! 4. a remark comment may be posted;
//! 5. results are reconciled against existing check runs and posted.
//!
//! Every mutation is expressed as a [`CheckEffect`] and applied through the
//! [`PullRequestHandler`]. A check that errors aborts the run before anything
//! is posted.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::checks::{CheckError, CheckRegistry, PullRequestContext};
use crate::effects::{BoxError, CheckEffect, PullRequestHandler, apply_effect};
use crate::types::RepoId;
use crate::webhooks::EligibleEvent;

pub mod executor;
pub mod gate;
pub mod reconcile;
pub mod remarks;

pub use executor::{CheckFault, run_checks};
pub use gate::{GateDecision, evaluate_skip_labels};
pub use reconcile::{SKIPPED_SUMMARY, full_check_name, reconcile};
pub use remarks::{FixedDice, RemarkDice, ThreadRngDice, choose_remark};

/// Errors that abort processing of a pull request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collaborator call (GitHub) failed.
    #[error("pull request handler failed: {0}")]
    Handler(#[source] BoxError),

    /// A registered check failed.
    #[error("check '{check}' failed: {source}")]
    Check {
        check: String,
        #[source]
        source: CheckError,
    },
}

impl EngineError {
    fn handler<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        EngineError::Handler(Box::new(e))
    }
}

impl From<CheckFault> for EngineError {
    fn from(fault: CheckFault) -> Self {
        EngineError::Check {
            check: fault.check,
            source: fault.source,
        }
    }
}

/// How a pull request run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// `pull_requests.enabled` is not set.
    Disabled,

    /// The pull request is closed.
    Closed,

    /// A skip label matched.
    SkippedByLabel { label: String },

    /// Checks ran and their results were posted.
    Checked {
        /// Number of fresh results posted.
        posted: usize,
        /// Number of stale check runs neutralized.
        neutralized: usize,
    },
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Disabled => write!(f, "Skipping PR checks, disabled in config."),
            ProcessOutcome::Closed => write!(f, "Pull request already closed, no need to check"),
            ProcessOutcome::SkippedByLabel { label } => {
                write!(f, "Skipping checks due to {label} label")
            }
            ProcessOutcome::Checked { .. } => write!(f, "Finished pull requests checks"),
        }
    }
}

/// Runs the registered checks for one pull request and posts the outcome.
#[instrument(skip_all, fields(repo = %repo, pr = %event.number, action = %event.action))]
pub async fn process_pull_request<H: PullRequestHandler>(
    registry: &CheckRegistry,
    handler: &H,
    bot_name: &str,
    repo: RepoId,
    event: &EligibleEvent,
    dice: &dyn RemarkDice,
) -> Result<ProcessOutcome, EngineError> {
    let config = handler.config().await.map_err(EngineError::handler)?;
    let pr_config = config.pull_requests();
    if !pr_config.enabled {
        debug!("Pull request checks disabled in config");
        return Ok(ProcessOutcome::Disabled);
    }

    let pr = handler.pull_request().await.map_err(EngineError::handler)?;
    if pr.is_closed {
        debug!("Pull request is closed");
        return Ok(ProcessOutcome::Closed);
    }

    if let GateDecision::Skip { label, report } =
        evaluate_skip_labels(&pr.labels, &pr_config, bot_name)
    {
        info!(label = %label, "Skipping checks due to label");
        if let Some(update) = report {
            apply_effect(handler, CheckEffect::SetCheck(update))
                .await
                .map_err(EngineError::handler)?;
        }
        return Ok(ProcessOutcome::SkippedByLabel { label });
    }

    let repo_handler = handler.repo_handler(&pr);
    let not_boring = config.get_config_value("not_boring", true);
    let context = PullRequestContext::new(repo, event.number, pr, config);

    let results = run_checks(registry, &event.action, &context, &repo_handler).await?;

    if let Some(body) = choose_remark(not_boring, event.is_new, dice) {
        apply_effect(handler, CheckEffect::PostComment { body })
            .await
            .map_err(EngineError::handler)?;
    }

    let existing = handler.list_checks().await.map_err(EngineError::handler)?;
    let updates = reconcile(bot_name, &results, &existing);
    let neutralized = updates.len() - results.len();

    for update in updates {
        apply_effect(handler, CheckEffect::SetCheck(update))
            .await
            .map_err(EngineError::handler)?;
    }

    info!(posted = results.len(), neutralized, "Finished pull request checks");
    Ok(ProcessOutcome::Checked {
        posted: results.len(),
        neutralized,
    })
}
