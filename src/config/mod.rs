//! Bot configuration loaded from TOML.
//!
//! Configuration lives under a `[tool.<bot_name>]` table, either in a global
//! file given at startup or in a repository's `pyproject.toml`. Each sub-table
//! is a *section* (for example `[tool.testbot.pull_requests]`). A repository's
//! configuration is layered over the global one with [`Config::update`]: keys
//! inside a section override individually, everything else is replaced.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not valid TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document has no `[tool.<name>]` table.
    #[error("no [tool.{0}] table in config")]
    MissingTool(String),
}

/// A tool-scoped configuration table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: toml::Table,
}

impl Config {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text, selecting the `[tool.<tool>]` table.
    pub fn loads(text: &str, tool: &str) -> Result<Self, ConfigError> {
        let mut document: toml::Table = text.parse()?;

        let values = match document.remove("tool") {
            Some(toml::Value::Table(mut tools)) => match tools.remove(tool) {
                Some(toml::Value::Table(values)) => values,
                _ => return Err(ConfigError::MissingTool(tool.to_string())),
            },
            _ => return Err(ConfigError::MissingTool(tool.to_string())),
        };

        Ok(Config { values })
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path, tool: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::loads(&text, tool)
    }

    /// Returns the sub-tables of this configuration, keyed by section name.
    pub fn sections(&self) -> BTreeMap<&str, &toml::Table> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.as_table().map(|t| (name.as_str(), t)))
            .collect()
    }

    /// Returns the raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    /// Layers `other` over this configuration.
    ///
    /// Sections present in both are merged key by key with `other` winning;
    /// any other key is replaced outright.
    pub fn update(&mut self, other: Config) {
        for (key, value) in other.values {
            match (self.values.get_mut(&key), value) {
                (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                    existing.extend(incoming);
                }
                (_, value) => {
                    self.values.insert(key, value);
                }
            }
        }
    }

    /// Looks up `key` and deserializes it as `T`, falling back to `default`.
    ///
    /// A value that is present but has the wrong shape is logged and treated
    /// as missing.
    pub fn get_config_value<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.values.get(key) {
            Some(value) => match value.clone().try_into() {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(key, error = %e, "Ignoring malformed config value");
                    default
                }
            },
            None => default,
        }
    }

    /// Returns the typed `pull_requests` section.
    pub fn pull_requests(&self) -> PullRequestsConfig {
        self.get_config_value("pull_requests", PullRequestsConfig::default())
    }
}

/// The `pull_requests` section controlling the check engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PullRequestsConfig {
    /// Checks only run when this is explicitly enabled.
    pub enabled: bool,

    /// Labels that suppress check execution.
    pub skip_labels: Vec<String>,

    /// Whether a matching skip label posts a failing check.
    pub skip_fails: bool,
}

impl Default for PullRequestsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            skip_labels: Vec::new(),
            skip_fails: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GLOBAL_TOML: &str = r#"
[tool.testbot]

[tool.testbot.plugin1]
setting1 = 'a'
setting2 = 'b'

[tool.testbot.plugin2]
setting3 = 1
"#;

    const REPO_TOML: &str = r#"
[tool.testbot]
not_boring = false

[tool.testbot.plugin1]
setting2 = 'c'

[tool.testbot.plugin2]
setting3 = 4
setting4 = 1.5

[tool.testbot.plugin3]
setting5 = 't'
"#;

    fn table(pairs: &[(&str, toml::Value)]) -> toml::Table {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn loads_selects_tool_sections() {
        let config = Config::loads(GLOBAL_TOML, "testbot").unwrap();
        let sections = config.sections();

        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections["plugin1"],
            &table(&[("setting1", "a".into()), ("setting2", "b".into())])
        );
        assert_eq!(sections["plugin2"], &table(&[("setting3", 1.into())]));
    }

    #[test]
    fn loads_missing_tool_is_error() {
        let result = Config::loads(GLOBAL_TOML, "otherbot");
        assert!(matches!(result, Err(ConfigError::MissingTool(name)) if name == "otherbot"));
    }

    #[test]
    fn loads_without_tool_table_is_error() {
        let result = Config::loads("[project]\nname = 'x'\n", "testbot");
        assert!(matches!(result, Err(ConfigError::MissingTool(_))));
    }

    #[test]
    fn loads_invalid_toml_is_error() {
        let result = Config::loads("[tool.testbot", "testbot");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_matches_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GLOBAL_TOML.as_bytes()).unwrap();

        let loaded = Config::load(file.path(), "testbot").unwrap();
        assert_eq!(loaded, Config::loads(GLOBAL_TOML, "testbot").unwrap());
    }

    #[test]
    fn update_overrides_per_key() {
        let mut config = Config::loads(GLOBAL_TOML, "testbot").unwrap();
        config.update(Config::loads(REPO_TOML, "testbot").unwrap());
        let sections = config.sections();

        assert_eq!(
            sections["plugin1"],
            &table(&[("setting1", "a".into()), ("setting2", "c".into())])
        );
        assert_eq!(
            sections["plugin2"],
            &table(&[("setting3", 4.into()), ("setting4", 1.5.into())])
        );
        assert_eq!(sections["plugin3"], &table(&[("setting5", "t".into())]));
        assert!(!config.get_config_value("not_boring", true));
    }

    #[test]
    fn get_config_value_falls_back_to_default() {
        let config = Config::new();
        assert!(config.get_config_value("not_boring", true));
        assert_eq!(config.pull_requests(), PullRequestsConfig::default());
    }

    #[test]
    fn get_config_value_ignores_wrong_shape() {
        let config = Config::loads("[tool.testbot]\nnot_boring = 'yes'\n", "testbot").unwrap();
        assert!(config.get_config_value("not_boring", true));
    }

    #[test]
    fn pull_requests_section_defaults() {
        let config = Config::loads(
            "[tool.testbot.pull_requests]\nenabled = true\nskip_labels = ['Experimental']\n",
            "testbot",
        )
        .unwrap();

        let pr = config.pull_requests();
        assert!(pr.enabled);
        assert_eq!(pr.skip_labels, vec!["Experimental".to_string()]);
        assert!(pr.skip_fails);
    }
}
