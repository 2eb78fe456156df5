//! Override-aware key/value store.
//!
//! `Store` is the visible resolution: section key -> value -> {symbol ->
//! origin group}. `History` keeps every (value, origin) attempt per symbol so
//! the active assignment and its origin can be found after overrides.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::groups::DEFAULT_GROUP;

/// (section-path, parameter-name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SectionKey {
    pub section: String,
    pub param: String,
}

impl SectionKey {
    pub fn new(section: impl Into<String>, param: impl Into<String>) -> Self {
        Self { section: section.into(), param: param.into() }
    }

    /// Same section with `prefix` glued in front of the parameter name
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self { section: self.section.clone(), param: format!("{prefix}{}", self.param) }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.section, self.param)
    }
}

/// symbol -> origin group
pub type Holders = BTreeMap<String, String>;

/// One assignment attempt for a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub value: String,
    pub origin: String,
}

/// key -> value -> holders
pub type StoreMap = BTreeMap<SectionKey, BTreeMap<String, Holders>>;

/// key -> symbol -> attempts, in arrival order
pub type History = BTreeMap<SectionKey, BTreeMap<String, Vec<Assignment>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    entries: StoreMap,
    history: History,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &StoreMap {
        &self.entries
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `value` for `symbol` at `key`, coming from group `origin`.
    ///
    /// A `DEFAULT` attempt never displaces an active non-default value; any
    /// other attempt evicts the symbol's previous active value.
    pub fn record(&mut self, key: &SectionKey, symbol: &str, value: &str, origin: &str) {
        let attempts = self
            .history
            .entry(key.clone())
            .or_default()
            .entry(symbol.to_string())
            .or_default();

        if let Some(prev) = attempts.last() {
            if prev.origin != DEFAULT_GROUP && origin == DEFAULT_GROUP {
                return;
            }
            // Evict even when the value is unchanged: the origin may differ.
            if let Some(values) = self.entries.get_mut(key) {
                if let Some(holders) = values.get_mut(&prev.value) {
                    holders.remove(symbol);
                    if holders.is_empty() {
                        values.remove(&prev.value);
                    }
                }
                if values.is_empty() {
                    self.entries.remove(key);
                }
            }
        }

        attempts.push(Assignment { value: value.to_string(), origin: origin.to_string() });
        self.entries
            .entry(key.clone())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(symbol.to_string(), origin.to_string());
    }

    /// Replay every (key, value, symbol, origin) of `other` through `record`
    pub fn merge(&mut self, other: &Store) {
        for (key, values) in &other.entries {
            for (value, holders) in values {
                for (symbol, origin) in holders {
                    self.record(key, symbol, value, origin);
                }
            }
        }
    }

    /// Active assignment of `symbol` at `key`
    pub fn active(&self, key: &SectionKey, symbol: &str) -> Option<&Assignment> {
        self.history.get(key)?.get(symbol)?.last()
    }

    /// Active value of `symbol` at `key`, looked up in the visible store
    pub fn value_of(&self, key: &SectionKey, symbol: &str) -> Option<&str> {
        self.entries
            .get(key)?
            .iter()
            .find(|(_, holders)| holders.contains_key(symbol))
            .map(|(value, _)| value.as_str())
    }
}
