//! Reconciliation of fresh results against check runs already on the commit.
//!
//! Every fresh result is posted, in name order. Afterwards every previously
//! posted check of this bot that no longer has a result is overwritten with a
//! neutral "skipped" run. The legacy check named exactly `<bot_name>` (left by
//! the skip gate) is always neutralized. Nothing is ever deleted.

use crate::checks::CheckResults;
use crate::effects::{CheckConclusion, CheckRunUpdate};

/// Summary of a neutralized check run.
pub const SKIPPED_SUMMARY: &str = "This check has been skipped";

/// Returns the full check-run name for a result.
pub fn full_check_name(bot_name: &str, check: &str) -> String {
    format!("{bot_name}:{check}")
}

/// Computes the check runs to post, in order.
pub fn reconcile(
    bot_name: &str,
    results: &CheckResults,
    existing: &[String],
) -> Vec<CheckRunUpdate> {
    let mut updates: Vec<CheckRunUpdate> = results
        .iter()
        .map(|(name, result)| {
            CheckRunUpdate::completed(
                full_check_name(bot_name, name),
                result.description.clone(),
                result.state.into(),
            )
            .with_details_url(result.target_url.clone())
        })
        .collect();

    let prefix = format!("{bot_name}:");
    for posted in existing {
        let stale = match posted.strip_prefix(&prefix) {
            Some(check) => !results.contains_key(check),
            None => posted == bot_name,
        };

        if stale {
            updates.push(CheckRunUpdate::completed(
                posted.clone(),
                SKIPPED_SUMMARY,
                CheckConclusion::Neutral,
            ));
        }
    }

    updates
}
