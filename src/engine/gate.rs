//! The skip-label gate.
//!
//! Runs after the enabled/closed short-circuits and before any check. The
//! first pull request label (in reported order) that appears in
//! `skip_labels` stops the run; with `skip_fails` it also posts one failing
//! check under the bare bot name.

use crate::config::PullRequestsConfig;
use crate::effects::{CheckConclusion, CheckRunUpdate};

/// Decision of the skip gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No skip label; run the checks.
    Proceed,

    /// A skip label matched; do not run any check.
    Skip {
        label: String,
        /// The failing check to post, if `skip_fails` is set.
        report: Option<CheckRunUpdate>,
    },
}

/// Evaluates the skip gate.
pub fn evaluate_skip_labels(
    labels: &[String],
    config: &PullRequestsConfig,
    bot_name: &str,
) -> GateDecision {
    let Some(label) = labels.iter().find(|l| config.skip_labels.contains(l)) else {
        return GateDecision::Proceed;
    };

    let report = config.skip_fails.then(|| {
        CheckRunUpdate::completed(
            bot_name,
            format!("Skipping checks due to {label} label"),
            CheckConclusion::Failure,
        )
    });

    GateDecision::Skip {
        label: label.clone(),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(skip_labels: &[&str], skip_fails: bool) -> PullRequestsConfig {
        PullRequestsConfig {
            enabled: true,
            skip_labels: skip_labels.iter().map(|s| s.to_string()).collect(),
            skip_fails,
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_labels_proceeds() {
        let decision = evaluate_skip_labels(&[], &config(&["skip-ci"], true), "bot");
        assert_eq!(decision, GateDecision::Proceed);
    }

    #[test]
    fn no_skip_labels_configured_proceeds() {
        let decision = evaluate_skip_labels(&labels(&["skip-ci"]), &config(&[], true), "bot");
        assert_eq!(decision, GateDecision::Proceed);
    }

    #[test]
    fn matching_label_reports_failure() {
        let decision =
            evaluate_skip_labels(&labels(&["bug", "skip-ci"]), &config(&["skip-ci"], true), "bot");

        assert_eq!(
            decision,
            GateDecision::Skip {
                label: "skip-ci".to_string(),
                report: Some(CheckRunUpdate::completed(
                    "bot",
                    "Skipping checks due to skip-ci label",
                    CheckConclusion::Failure,
                )),
            }
        );
    }

    #[test]
    fn matching_label_without_skip_fails_is_silent() {
        let decision =
            evaluate_skip_labels(&labels(&["skip-ci"]), &config(&["skip-ci"], false), "bot");

        assert_eq!(
            decision,
            GateDecision::Skip {
                label: "skip-ci".to_string(),
                report: None,
            }
        );
    }

    #[test]
    fn first_matching_label_in_pr_order_wins() {
        let decision = evaluate_skip_labels(
            &labels(&["Experimental", "skip-ci"]),
            &config(&["skip-ci", "Experimental"], true),
            "bot",
        );

        match decision {
            GateDecision::Skip { label, report } => {
                assert_eq!(label, "Experimental");
                assert_eq!(
                    report.unwrap().summary,
                    "Skipping checks due to Experimental label"
                );
            }
            GateDecision::Proceed => panic!("expected skip"),
        }
    }
}
