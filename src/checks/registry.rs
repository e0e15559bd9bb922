//! The check registry.
//!
//! Checks are collected into a [`CheckRegistryBuilder`] at startup and frozen
//! into a [`CheckRegistry`], which is then shared read-only (behind an `Arc`)
//! by every webhook invocation. Entries are keyed and iterated by check name.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::Check;

/// A registered check together with its action filter.
#[derive(Clone)]
pub struct RegisteredCheck {
    check: Arc<dyn Check>,
    actions: Option<BTreeSet<String>>,
}

impl RegisteredCheck {
    pub fn check(&self) -> &dyn Check {
        self.check.as_ref()
    }

    /// The actions this check runs for; `None` means every default action.
    pub fn actions(&self) -> Option<&BTreeSet<String>> {
        self.actions.as_ref()
    }

    /// Returns true if the check should run for `action`.
    pub fn runs_for(&self, action: &str) -> bool {
        match &self.actions {
            None => true,
            Some(actions) => actions.contains(action),
        }
    }
}

impl fmt::Debug for RegisteredCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCheck")
            .field("name", &self.check.name())
            .field("actions", &self.actions)
            .finish()
    }
}

/// Collects check registrations before the registry is frozen.
#[derive(Default)]
pub struct CheckRegistryBuilder {
    checks: BTreeMap<String, RegisteredCheck>,
}

impl CheckRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `check`, restricted to `actions` if given.
    ///
    /// Re-registering a name replaces the earlier check and its action filter.
    pub fn register<C, I, S>(mut self, check: C, actions: Option<I>) -> Self
    where
        C: Check + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = check.name().to_string();
        let actions = actions.map(|a| a.into_iter().map(Into::into).collect::<BTreeSet<_>>());

        debug!(check = %name, actions = ?actions, "Registering check");

        self.checks.insert(
            name,
            RegisteredCheck {
                check: Arc::new(check),
                actions,
            },
        );
        self
    }

    /// Registers `check` for every default action.
    pub fn register_all_actions<C: Check + 'static>(self, check: C) -> Self {
        self.register(check, None::<Vec<String>>)
    }

    pub fn build(self) -> CheckRegistry {
        CheckRegistry {
            checks: self.checks,
        }
    }
}

/// The frozen set of registered checks.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: BTreeMap<String, RegisteredCheck>,
}

impl CheckRegistry {
    pub fn builder() -> CheckRegistryBuilder {
        CheckRegistryBuilder::new()
    }

    /// Returns every registered check, sorted by name.
    pub fn all_checks(&self) -> impl Iterator<Item = (&str, &RegisteredCheck)> {
        self.checks.iter().map(|(name, check)| (name.as_str(), check))
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Returns the action filter of `name`; the outer `None` means not registered.
    pub fn actions_for(&self, name: &str) -> Option<Option<&BTreeSet<String>>> {
        self.checks.get(name).map(RegisteredCheck::actions)
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.checks.values()).finish()
    }
}
