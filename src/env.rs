//! Environment resolution
//!
//! All operator-supplied input arrives as environment variables. Lookups go
//! through the [`Environment`] trait so assemblers can run against a synthetic
//! map in tests instead of the process environment.
//!
//! Presence and non-emptiness are distinct: a variable set to `""` is present.

use std::collections::HashMap;

/// Read-only source of environment variables
pub trait Environment {
    /// Value of `name`, or `None` when the variable is not present at all
    fn get(&self, name: &str) -> Option<String>;

    /// Returns `(value, was_set)`. An explicitly empty variable counts as set.
    fn coalesce(&self, name: &str, fallback: &str) -> (String, bool) {
        match self.get(name) {
            Some(value) => (value, true),
            None => (fallback.to_string(), false),
        }
    }

    /// Value of `name` or `fallback`, discarding the presence flag
    fn value_or(&self, name: &str, fallback: &str) -> String {
        self.coalesce(name, fallback).0
    }

    /// Value of `name` only when it is set and non-empty
    fn non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// True when `name` is exactly `"true"`
    fn is_true(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v == "true")
    }
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        // Non-unicode values are passed through lossily rather than treated as absent
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

/// In-memory environment
#[derive(Debug, Default, Clone)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Environment for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
