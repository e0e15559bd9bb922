//! Checks shipped with the bot.
//!
//! Both are opt-in: they return `None` unless their configuration section is
//! present and enabled.
//!
//! ```toml
//! [tool.mybot.changelog_checker]
//! enabled = true
//! filename = "CHANGES.rst"
//! skip_label = "no-changelog-entry-needed"
//!
//! [tool.mybot.blocking_labels]
//! enabled = true
//! labels = ["Work in progress", "Do not merge"]
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use crate::effects::RepoHandler;

use super::{Check, CheckError, CheckResult, CheckResults, PullRequestContext};

/// Configuration for [`ChangelogCheck`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    pub enabled: bool,
    pub filename: String,
    pub skip_label: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: "CHANGES.rst".to_string(),
            skip_label: "no-changelog-entry-needed".to_string(),
        }
    }
}

/// Requires the changelog on the head branch to mention the pull request.
#[derive(Debug, Default)]
pub struct ChangelogCheck;

#[async_trait]
impl Check for ChangelogCheck {
    fn name(&self) -> &str {
        "changelog"
    }

    async fn run(
        &self,
        pr: &PullRequestContext,
        repo: &dyn RepoHandler,
    ) -> Result<Option<CheckResults>, CheckError> {
        let config: ChangelogConfig =
            pr.get_config_value("changelog_checker", ChangelogConfig::default());
        if !config.enabled {
            return Ok(None);
        }

        let result = if pr.labels().iter().any(|l| *l == config.skip_label) {
            CheckResult::success("Changelog entry not required")
        } else {
            let contents = repo
                .file_contents(&config.filename)
                .await
                .map_err(CheckError::Repository)?;

            match contents {
                None => CheckResult::failure(format!("{} not found", config.filename)),
                Some(text) if mentions_pull_request(&text, pr.number().0) => {
                    CheckResult::success("Changelog entry present")
                }
                Some(_) => CheckResult::failure(format!(
                    "No changelog entry referencing {} in {}",
                    pr.number(),
                    config.filename
                )),
            }
        };

        Ok(Some(CheckResults::from([("changelog".to_string(), result)])))
    }
}

/// Returns true if `text` contains `#<number>` not followed by another digit.
fn mentions_pull_request(text: &str, number: u64) -> bool {
    let needle = format!("#{number}");
    text.match_indices(&needle).any(|(idx, _)| {
        !text[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// Configuration for [`BlockingLabelsCheck`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlockingLabelsConfig {
    pub enabled: bool,
    pub labels: Vec<String>,
}

/// Fails while the pull request carries any configured blocking label.
#[derive(Debug, Default)]
pub struct BlockingLabelsCheck;

#[async_trait]
impl Check for BlockingLabelsCheck {
    fn name(&self) -> &str {
        "blocking_labels"
    }

    async fn run(
        &self,
        pr: &PullRequestContext,
        _repo: &dyn RepoHandler,
    ) -> Result<Option<CheckResults>, CheckError> {
        let config: BlockingLabelsConfig =
            pr.get_config_value("blocking_labels", BlockingLabelsConfig::default());
        if !config.enabled {
            return Ok(None);
        }

        let result = match pr.labels().iter().find(|l| config.labels.contains(l)) {
            Some(label) => CheckResult::failure(format!("Pull request is labeled '{label}'")),
            None => CheckResult::success("No blocking labels"),
        };

        Ok(Some(CheckResults::from([("labels".to_string(), result)])))
    }
}
