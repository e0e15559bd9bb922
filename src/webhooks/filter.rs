//! Event eligibility filter.
//!
//! Decides whether a delivery should run the pull request checks. Ineligible
//! deliveries are a normal outcome: the filter returns a short reason that
//! ends up in the webhook response and the logs.

use crate::types::PrNumber;

use super::events::{EventKind, WebhookEvent};

/// `pull_request` actions that trigger the checks.
pub const PULL_REQUEST_ACTIONS: &[&str] = &["unlabeled", "labeled", "synchronize", "opened"];

/// `issues` actions that trigger the checks.
pub const ISSUES_ACTIONS: &[&str] = &["milestoned", "demilestoned"];

/// Reason given for deliveries that are neither `pull_request` nor `issues`.
pub const NOT_PR_OR_ISSUES: &str = "Not a pull_request or issues event";

/// A delivery that should run the checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleEvent {
    /// The pull request to check.
    pub number: PrNumber,

    /// The triggering action, matched against each check's action filter.
    pub action: String,

    /// True iff this is a `pull_request` `opened` delivery.
    pub is_new: bool,
}

/// Outcome of filtering a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The checks should run.
    Eligible(EligibleEvent),

    /// Nothing to do; carries a human-readable reason.
    Ignored(String),
}

/// Returns true if `action` on an event of `kind` triggers the checks.
pub fn is_eligible_action(kind: &EventKind, action: &str) -> bool {
    match kind {
        EventKind::PullRequest => PULL_REQUEST_ACTIONS.contains(&action),
        EventKind::Issues => ISSUES_ACTIONS.contains(&action),
        EventKind::Other(_) => false,
    }
}

/// Filters a parsed delivery.
pub fn filter_event(event: &WebhookEvent) -> FilterOutcome {
    if let EventKind::Other(_) = event.kind {
        return FilterOutcome::Ignored(NOT_PR_OR_ISSUES.to_string());
    }

    if !is_eligible_action(&event.kind, &event.action) {
        return FilterOutcome::Ignored(format!(
            "Action '{}' does not require action",
            event.action
        ));
    }

    let Some(number) = event.number else {
        return FilterOutcome::Ignored("Not an issue or pull request".to_string());
    };

    FilterOutcome::Eligible(EligibleEvent {
        number,
        action: event.action.clone(),
        is_new: event.kind == EventKind::PullRequest && event.action == "opened",
    })
}
