//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Payload parsing into [`WebhookEvent`]
//! - The eligibility filter deciding whether the checks run

pub mod events;
pub mod filter;
pub mod parser;
pub mod signature;

pub use events::{EventKind, WebhookEvent};
pub use filter::{EligibleEvent, FilterOutcome, NOT_PR_OR_ISSUES, filter_event};
pub use parser::{ParseError, parse_webhook};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
