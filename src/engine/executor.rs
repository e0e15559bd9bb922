//! Runs the registered checks for one pull request.
//!
//! Checks run sequentially in registry (name) order. Each check's results are
//! folded into one map; a later check reusing a result name overwrites the
//! earlier entry. The first check that errors aborts the batch.

use tracing::{debug, warn};

use crate::checks::{CheckError, CheckRegistry, CheckResults, PullRequestContext, merge_results};
use crate::effects::RepoHandler;

/// A check failed; the run is aborted.
#[derive(Debug, thiserror::Error)]
#[error("check '{check}' failed: {source}")]
pub struct CheckFault {
    pub check: String,
    #[source]
    pub source: CheckError,
}

/// Runs every check registered for `action` and merges their results.
pub async fn run_checks(
    registry: &CheckRegistry,
    action: &str,
    pr: &PullRequestContext,
    repo: &dyn RepoHandler,
) -> Result<CheckResults, CheckFault> {
    let mut results = CheckResults::new();

    for (name, registered) in registry.all_checks() {
        if !registered.runs_for(action) {
            debug!(check = name, action, "Check not registered for action");
            continue;
        }

        match registered.check().run(pr, repo).await {
            Ok(Some(produced)) => {
                debug!(check = name, results = produced.len(), "Check produced results");
                merge_results(&mut results, produced);
            }
            Ok(None) => debug!(check = name, "Check skipped itself"),
            Err(source) => {
                warn!(check = name, error = %source, "Check failed, aborting run");
                return Err(CheckFault {
                    check: name.to_string(),
                    source,
                });
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckResult, FnCheck};
    use crate::config::Config;
    use crate::test_utils::{CountingCheck, MockRepo, context, results};

    #[tokio::test]
    async fn merges_results_from_all_checks() {
        let registry = CheckRegistry::builder()
            .register_all_actions(FnCheck::new("a", |_| {
                Ok(Some(results(&[("style", CheckResult::success("ok"))])))
            }))
            .register_all_actions(FnCheck::new("b", |_| {
                Ok(Some(results(&[("lint", CheckResult::failure("bad"))])))
            }))
            .build();

        let merged = run_checks(&registry, "opened", &context(&[], Config::new()), &MockRepo::default())
            .await
            .unwrap();

        assert_eq!(
            merged,
            results(&[
                ("lint", CheckResult::failure("bad")),
                ("style", CheckResult::success("ok")),
            ])
        );
    }

    #[tokio::test]
    async fn later_check_wins_on_collision() {
        let registry = CheckRegistry::builder()
            .register_all_actions(FnCheck::new("a_first", |_| {
                Ok(Some(results(&[("style", CheckResult::failure("first"))])))
            }))
            .register_all_actions(FnCheck::new("b_second", |_| {
                Ok(Some(results(&[("style", CheckResult::success("second"))])))
            }))
            .build();

        let merged = run_checks(&registry, "opened", &context(&[], Config::new()), &MockRepo::default())
            .await
            .unwrap();

        assert_eq!(merged["style"], CheckResult::success("second"));
    }

    #[tokio::test]
    async fn none_results_are_ignored() {
        let registry = CheckRegistry::builder()
            .register_all_actions(FnCheck::new("skipper", |_| Ok(None)))
            .build();

        let merged = run_checks(&registry, "opened", &context(&[], Config::new()), &MockRepo::default())
            .await
            .unwrap();

        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn action_filter_is_respected() {
        let opened_only = CountingCheck::new("opened_only");
        let always = CountingCheck::new("always");
        let registry = CheckRegistry::builder()
            .register(opened_only.clone(), Some(["opened"]))
            .register_all_actions(always.clone())
            .build();

        run_checks(&registry, "synchronize", &context(&[], Config::new()), &MockRepo::default())
            .await
            .unwrap();

        assert_eq!(opened_only.calls(), 0);
        assert_eq!(always.calls(), 1);
    }

    #[tokio::test]
    async fn failing_check_aborts_remaining_checks() {
        let later = CountingCheck::new("z_later");
        let registry = CheckRegistry::builder()
            .register_all_actions(FnCheck::new("a_broken", |_| {
                Err(CheckError::Failed("boom".to_string()))
            }))
            .register_all_actions(later.clone())
            .build();

        let err = run_checks(&registry, "opened", &context(&[], Config::new()), &MockRepo::default())
            .await
            .unwrap_err();

        assert_eq!(err.check, "a_broken");
        assert_eq!(later.calls(), 0);
    }
}
