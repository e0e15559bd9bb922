//! PR check bot - a GitHub bot that runs registered checks on pull requests.
//!
//! This library provides the check registry and contract, the event filter,
//! the orchestration engine with its reconciliation of check runs, and the
//! GitHub and HTTP plumbing around them.

pub mod checks;
pub mod config;
pub mod effects;
pub mod engine;
pub mod github;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
