//! Webhook endpoint handler.
//!
//! Verifies the delivery, parses and filters it, then runs the check engine
//! inline and answers with the engine's status string.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::engine::{EngineError, ThreadRngDice, process_pull_request};
use crate::github::{GitHubPullRequestHandler, OctocrabClient};
use crate::types::DeliveryId;
use crate::webhooks::{
    EventKind, FilterOutcome, NOT_PR_OR_ISSUES, ParseError, filter_event, parse_webhook,
    verify_signature,
};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// The body is not a usable webhook payload.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// The engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Engine(EngineError::Handler(_)) => StatusCode::BAD_GATEWAY,
            WebhookError::Engine(EngineError::Check { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-GitHub-Event` (required)
///   - `X-Hub-Signature-256` (required when a webhook secret is configured)
///   - `X-GitHub-Delivery` (optional, logged)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: the event was handled or ignored; the body says which
/// - 400 Bad Request: missing header or unusable payload
/// - 401 Unauthorized: invalid signature
/// - 500 Internal Server Error: a check failed
/// - 502 Bad Gateway: a GitHub API call failed
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)
        .map(DeliveryId::new)
        .unwrap_or_else(|_| DeliveryId::new("unknown"));

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    if let Some(secret) = app_state.webhook_secret() {
        let signature_header = get_header(&headers, HEADER_SIGNATURE)?;
        if !verify_signature(&body, &signature_header, secret) {
            warn!(delivery_id = %delivery_id, "Invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }
    }

    // Other event kinds (ping, installation, ...) may not even name a repository.
    if let EventKind::Other(_) = EventKind::from_header(&event_type) {
        debug!(delivery_id = %delivery_id, "Ignoring event kind");
        return Ok((StatusCode::OK, NOT_PR_OR_ISSUES.to_string()));
    }

    let event = parse_webhook(&event_type, &body)?;

    let eligible = match filter_event(&event) {
        FilterOutcome::Eligible(eligible) => eligible,
        FilterOutcome::Ignored(reason) => {
            debug!(delivery_id = %delivery_id, reason = %reason, "Ignoring webhook");
            return Ok((StatusCode::OK, reason));
        }
    };

    if let Some(installation) = event.installation {
        debug!(installation = %installation, "Delivery from app installation");
    }

    let handler = GitHubPullRequestHandler::new(
        OctocrabClient::new(app_state.github().clone(), event.repo.clone()),
        eligible.number,
        app_state.bot_name(),
        app_state.global_config(),
    );

    let outcome = process_pull_request(
        app_state.registry(),
        &handler,
        app_state.bot_name(),
        event.repo.clone(),
        &eligible,
        &ThreadRngDice,
    )
    .await
    .inspect_err(|e| warn!(delivery_id = %delivery_id, error = %e, "Pull request processing failed"))?;

    info!(
        delivery_id = %delivery_id,
        repo = %event.repo,
        pr = %eligible.number,
        outcome = %outcome,
        "Processed webhook"
    );
    Ok((StatusCode::OK, outcome.to_string()))
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
