// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment lookups with rerun tracking.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Source of environment variables.
pub trait EnvSource {
    /// Looks up `key`. Unset is `Ok(None)`.
    fn var(&self, key: &str) -> Result<Option<String>>;
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Result<Option<String>> {
        (**self).var(key)
    }
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<Option<String>> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(Error::NotUnicode(key.to_string())),
        }
    }
}

/// Fixed in-memory environment, mainly for tests and dry runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<Option<String>> {
        Ok(self.vars.get(key).cloned())
    }
}

/// Wraps a source and remembers every key read, in first-read order.
#[derive(Debug)]
pub struct Tracked<E> {
    inner: E,
    seen: RefCell<Vec<String>>,
}

impl<E: EnvSource> Tracked<E> {
    /// Starts tracking lookups against `inner`.
    pub fn new(inner: E) -> Self {
        Self { inner, seen: RefCell::new(Vec::new()) }
    }

    /// Reads `key` and records it.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.note(key);
        self.inner.var(key)
    }

    /// Like [`Tracked::get`], but an empty value counts as unset.
    pub fn get_nonempty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key)?.filter(|value| !value.is_empty()))
    }

    /// Records `key` without reading it.
    pub fn note(&self, key: &str) {
        let mut seen = self.seen.borrow_mut();
        if !seen.iter().any(|k| k == key) {
            seen.push(key.to_string());
        }
    }

    /// Keys read so far.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl<E: EnvSource> EnvSource for Tracked<E> {
    fn var(&self, key: &str) -> Result<Option<String>> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_records_each_key_once() {
        let env = Tracked::new(MapEnv::new().with("A", "1"));
        assert_eq!(env.get("A").unwrap().as_deref(), Some("1"));
        assert_eq!(env.get("B").unwrap(), None);
        env.get("A").unwrap();
        assert_eq!(env.seen(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn empty_counts_as_unset() {
        let env = Tracked::new(MapEnv::from_iter([("EMPTY", "")]));
        assert_eq!(env.get_nonempty("EMPTY").unwrap(), None);
        assert_eq!(env.seen(), vec!["EMPTY".to_string()]);
    }
}
