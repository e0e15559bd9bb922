//! GitHub webhook event types.
//!
//! The bot only reacts to `pull_request` and `issues` deliveries. Every other
//! event kind is still parsed into a [`WebhookEvent`] (as [`EventKind::Other`])
//! so that the filter can report why it was ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{InstallationId, PrNumber, RepoId};

/// The kind of a webhook delivery, from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A pull request was labeled, unlabeled, synchronized, opened, etc.
    PullRequest,
    /// An issue (or the issue side of a pull request) changed.
    Issues,
    /// Any other event kind, kept verbatim.
    Other(String),
}

impl EventKind {
    /// Maps an `X-GitHub-Event` header value onto an event kind.
    pub fn from_header(value: &str) -> Self {
        match value {
            "pull_request" => EventKind::PullRequest,
            "issues" => EventKind::Issues,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Returns the header spelling of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PullRequest => "pull_request",
            EventKind::Issues => "issues",
            EventKind::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// The event kind.
    pub kind: EventKind,

    /// The payload's `action` field (empty if the event has none).
    pub action: String,

    /// The subject number.
    ///
    /// `pull_request.number` for pull request events. For issue events this
    /// is only set when the issue is a pull request, since checks can only
    /// run against pull requests.
    pub number: Option<PrNumber>,

    /// The repository the event belongs to.
    pub repo: RepoId,

    /// The GitHub App installation that delivered the event, if any.
    pub installation: Option<InstallationId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_header_known_kinds() {
        assert_eq!(EventKind::from_header("pull_request"), EventKind::PullRequest);
        assert_eq!(EventKind::from_header("issues"), EventKind::Issues);
    }

    #[test]
    fn from_header_keeps_unknown_kinds() {
        let kind = EventKind::from_header("push");
        assert_eq!(kind, EventKind::Other("push".to_string()));
        assert_eq!(kind.to_string(), "push");
    }
}
