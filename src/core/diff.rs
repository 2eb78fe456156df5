//! Semantic comparison of two resolved configurations.
//!
//! `Resolution::diff` walks every (key, symbol) assignment of the baseline
//! and looks it up in the other side. Keys missing there are retried against
//! more general compound sections before being reported as removed (`-key`,
//! or `+key` when the comparison runs in reverse). Changed values are shown
//! as `old<->new`, or as `-{elem}+{elem}` deltas for list-valued parameters
//! configured through `KVSEPS`.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::core::error::Warning;
use crate::core::hierarchy::parse_compound;
use crate::core::resolver::Resolution;
use crate::core::store::{Assignment, SectionKey};
use crate::infra::utils::TextUtils;

/// Characters accepted as list separators
pub const ALLOWED_SEPS: &str = ",;:.-_+=";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KvSepsError {
    #[error("bad KVSEPS '{spec}': expected ALL<sep> or <name><sep>[<name><sep>...] with <sep> one of ,;:.-_+=")]
    Malformed { spec: String },
}

/// Per-parameter list separators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvSeps {
    fallback: Option<char>,
    by_name: BTreeMap<String, char>,
}

impl KvSeps {
    /// Parse `ALL<sep>` (one separator for every parameter) or a
    /// concatenation of `<name><sep>` entries.
    pub fn parse(spec: &str) -> Result<Self, KvSepsError> {
        let mut seps = Self::default();
        let malformed = || KvSepsError::Malformed { spec: spec.to_string() };

        if let Some(rest) = spec.strip_prefix("ALL") {
            let mut chars = rest.chars();
            if let (Some(sep), None) = (chars.next(), chars.next())
                && ALLOWED_SEPS.contains(sep)
            {
                seps.fallback = Some(sep);
                return Ok(seps);
            }
        }

        let mut rest = spec;
        while !rest.is_empty() {
            let Some(pos) = rest.find(|c| ALLOWED_SEPS.contains(c)) else {
                return Err(malformed());
            };
            if pos == 0 {
                return Err(malformed());
            }
            let sep = rest[pos..].chars().next().ok_or_else(malformed)?;
            seps.by_name.insert(rest[..pos].to_string(), sep);
            rest = &rest[pos + sep.len_utf8()..];
        }
        Ok(seps)
    }

    pub fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_name.is_empty()
    }

    /// Separator for `param`: exact name, then the longest configured name
    /// that prefixes it, then the `ALL` fallback.
    pub fn separator_for(&self, param: &str) -> Option<char> {
        if let Some(sep) = self.by_name.get(param) {
            return Some(*sep);
        }
        self.by_name
            .iter()
            .filter(|(name, _)| param.starts_with(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, sep)| *sep)
            .or(self.fallback)
    }
}

impl FromStr for KvSeps {
    type Err = KvSepsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Describe how `left` turned into `right` for parameter `param`.
///
/// Unless both sides contain the parameter's separator the answer is the
/// pair `left<->right` (`left<-*>right` when `derived`). Otherwise both
/// sides are split into element sets and the result lists `-{elem}` for
/// each removed and `+{elem}` for each added element, empty when only the
/// order changed. `derived` marks a comparison made through a fallback
/// key; a non-empty delta then ends with `*`.
pub fn val_sep_diff(seps: &KvSeps, param: &str, left: &str, right: &str, derived: bool) -> String {
    let sep = match seps.separator_for(param) {
        Some(sep) if left.contains(sep) && right.contains(sep) => sep,
        _ => {
            let arrow = if derived { "<-*>" } else { "<->" };
            return format!("{left}{arrow}{right}");
        }
    };

    let delims = sep.to_string();
    let old: BTreeSet<&str> = TextUtils::split_any(left, &delims).into_iter().collect();
    let new: BTreeSet<&str> = TextUtils::split_any(right, &delims).into_iter().collect();

    let mut out = String::new();
    let removed: Vec<&str> = old.difference(&new).copied().collect();
    if !removed.is_empty() {
        out.push_str(&format!("-{{{}}}", TextUtils::join(&removed, "}-{")));
    }
    let added: Vec<&str> = new.difference(&old).copied().collect();
    if !added.is_empty() {
        out.push_str(&format!("+{{{}}}", TextUtils::join(&added, "}+{")));
    }
    if derived && !out.is_empty() {
        out.push('*');
    }
    out
}

/// Number of qualifier parts of a section, 0 for plain labels
fn specificity(section: &str) -> usize {
    parse_compound(section).map_or(0, |(_, _, parts)| parts.len())
}

impl Resolution {
    /// Differences between this configuration and `updated`.
    ///
    /// The result shares this instance's group vocabulary so it renders with
    /// the same names. With `reverse` the roles are swapped for reporting:
    /// removals become `+key` and value deltas still read from `updated` to
    /// `self`, which lets `b.diff(&a, true)` supply what `a.diff(&b, false)`
    /// cannot see.
    pub fn diff(&self, updated: &Resolution, reverse: bool) -> Resolution {
        let mut cmp = Resolution::empty(self.options.clone());
        cmp.groups = self.groups.clone();
        cmp.extra = self.extra.clone();
        cmp.stars = self.stars.clone();
        cmp.index = self.index.clone();
        cmp.naming.custom = self.naming.custom.clone();

        let marker = if reverse { "+" } else { "-" };
        let seps = &self.options.kv_seps;
        let theirs = updated.store.history();

        let delta = |key: &SectionKey, mine: &Assignment, other: &Assignment, derived: bool| {
            if reverse {
                val_sep_diff(seps, &key.param, &other.value, &mine.value, derived)
            } else {
                val_sep_diff(seps, &key.param, &mine.value, &other.value, derived)
            }
        };

        for (key, symbols) in self.store.history() {
            let Some(their_symbols) = theirs.get(key) else {
                // Missing key: try more general sections before calling it gone.
                let mut matched: BTreeMap<&str, usize> = BTreeMap::new();
                for general in self.index.fallbacks(key, &updated.index) {
                    let Some(general_symbols) = theirs.get(&general) else {
                        continue;
                    };
                    let depth = specificity(&general.section);
                    for (symbol, attempts) in symbols {
                        let Some(other) = general_symbols.get(symbol).and_then(|a| a.last()) else {
                            continue;
                        };
                        if let Some(&seen) = matched.get(symbol.as_str()) {
                            if seen == depth {
                                warn!(%symbol, %key, "symbol found many times in fallback lookup");
                                cmp.push_warning(Warning::AmbiguousFallback {
                                    symbol: symbol.clone(),
                                    section: key.section.clone(),
                                    param: key.param.clone(),
                                });
                            }
                            continue;
                        }
                        matched.insert(symbol, depth);
                        let Some(mine) = attempts.last() else {
                            continue;
                        };
                        if mine.value != other.value {
                            let d = delta(key, mine, other, true);
                            if !d.is_empty() {
                                cmp.store.record(key, symbol, &d, &mine.origin);
                            }
                        }
                    }
                }

                let gone = key.prefixed(marker);
                for (symbol, attempts) in symbols {
                    if matched.contains_key(symbol.as_str()) {
                        continue;
                    }
                    if let Some(mine) = attempts.last() {
                        cmp.store.record(&gone, symbol, &mine.value, &mine.origin);
                    }
                }
                continue;
            };

            for (symbol, attempts) in symbols {
                let Some(mine) = attempts.last() else {
                    continue;
                };
                match their_symbols.get(symbol).and_then(|a| a.last()) {
                    None => cmp.store.record(&key.prefixed(marker), symbol, &mine.value, &mine.origin),
                    Some(other) if other.value != mine.value => {
                        let d = delta(key, mine, other, false);
                        if !d.is_empty() {
                            cmp.store.record(key, symbol, &d, &mine.origin);
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        debug!(keys = cmp.store.entries().len(), reverse, "diff computed");
        cmp
    }
}
