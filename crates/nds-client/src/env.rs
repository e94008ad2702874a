//! Environment lookup capability.
//!
//! Server lists come from environment variables. Reads go through
//! [`EnvSource`] so tests can supply values without touching the real
//! process environment.

use std::collections::HashMap;

/// Read-only access to environment-style configuration.
pub trait EnvSource {
    /// Value of `name`, or `None` when unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    /// An empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// Which environment variable(s) supply server lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvSelection {
    /// The primary variable, falling back to the secondary one when unset or empty
    #[default]
    Default,
    /// Only the named variable
    Named(String),
    /// Ignore the environment
    Disabled,
}

impl EnvSelection {
    /// Select a named variable.
    pub fn named(name: impl Into<String>) -> Self {
        EnvSelection::Named(name.into())
    }
}
