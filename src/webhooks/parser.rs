//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into a [`WebhookEvent`]. Only the fields the check
//! engine needs are read; everything else in the payload is ignored.
//!
//! # Parsing Strategy
//!
//! 1. The event kind comes from the `X-GitHub-Event` header
//! 2. `repository` is required for every kind
//! 3. `pull_request.number` / `issue.number` are required for the matching kind,
//!    but only when the action would run the checks
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{InstallationId, PrNumber, RepoId};

use super::events::{EventKind, WebhookEvent};
use super::filter::is_eligible_action;

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A field required for this event kind is absent.
    #[error("missing field {0} in {1} payload")]
    MissingField(&'static str, String),

    /// Field has an invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Examples
///
/// ```
/// use pr_check_bot::webhooks::{parse_webhook, EventKind};
///
/// let payload = br#"{
///     "action": "opened",
///     "pull_request": { "number": 42 },
///     "repository": { "owner": { "login": "octocat" }, "name": "hello-world" }
/// }"#;
///
/// let event = parse_webhook("pull_request", payload).unwrap();
/// assert_eq!(event.kind, EventKind::PullRequest);
/// assert_eq!(event.number.map(|n| n.0), Some(42));
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<WebhookEvent, ParseError> {
    let raw: RawPayload = serde_json::from_slice(payload)?;
    let kind = EventKind::from_header(event_type);
    let action = raw.action.unwrap_or_default();

    // Ineligible actions are ignored by the filter, subject or not.
    if !is_eligible_action(&kind, &action) {
        return Ok(WebhookEvent {
            kind,
            action,
            number: None,
            repo: raw.repository.into_repo_id()?,
            installation: raw.installation.map(|i| InstallationId(i.id)),
        });
    }

    let number = match kind {
        EventKind::PullRequest => {
            let pr = raw
                .pull_request
                .ok_or_else(|| ParseError::MissingField("pull_request", kind.to_string()))?;
            Some(pr.number.into_pr_number()?)
        }
        EventKind::Issues => {
            let issue = raw
                .issue
                .ok_or_else(|| ParseError::MissingField("issue", kind.to_string()))?;
            let number = issue.number.into_pr_number()?;
            // If this field is present, the issue is actually a PR
            issue.pull_request.map(|_| number)
        }
        EventKind::Other(_) => None,
    };

    Ok(WebhookEvent {
        kind,
        action,
        number,
        repo: raw.repository.into_repo_id()?,
        installation: raw.installation.map(|i| InstallationId(i.id)),
    })
}

// ============================================================================
// Raw payload structures for deserialization
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPayload {
    action: Option<String>,
    pull_request: Option<RawSubject>,
    issue: Option<RawIssue>,
    repository: RawRepository,
    installation: Option<RawInstallation>,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    number: RawNumber,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: RawNumber,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
}

/// Repository info; `owner`/`name` are preferred, `full_name` is the fallback.
#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: Option<RawOwner>,
    name: Option<String>,
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

impl RawRepository {
    fn into_repo_id(self) -> Result<RepoId, ParseError> {
        if let (Some(owner), Some(name)) = (self.owner, self.name) {
            return Ok(RepoId::new(owner.login, name));
        }

        match self.full_name {
            Some(full_name) => {
                RepoId::parse_full_name(&full_name).ok_or(ParseError::InvalidField {
                    field: "repository.full_name",
                    value: full_name,
                })
            }
            None => Err(ParseError::InvalidField {
                field: "repository",
                value: "neither owner/name nor full_name present".to_string(),
            }),
        }
    }
}

/// Subject numbers are integers in GitHub payloads, but some replayed or
/// hand-written deliveries carry them as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Text(String),
}

impl RawNumber {
    fn into_pr_number(self) -> Result<PrNumber, ParseError> {
        match self {
            RawNumber::Int(n) => Ok(PrNumber(n)),
            RawNumber::Text(s) => s.parse().map(PrNumber).map_err(|_| ParseError::InvalidField {
                field: "number",
                value: s,
            }),
        }
    }
}
