//! Group definitions table and the `A^B` conjunction algebra.
//!
//! Explicit groups come from `#groupdef` blocks. Evaluating a conjunction
//! memoizes up to four derived groups under reserved names:
//!
//! | name    | content            | registered when                       |
//! |---------|--------------------|---------------------------------------|
//! | `A^B`   | A ∩ B              | non-empty and different from A and B  |
//! | `(A+B)` | A ∪ B              | different from A                      |
//! | `(A-B)` | A − B              | non-empty and different from A        |
//! | `(B-A)` | B − A              | non-empty and different from B        |

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::core::error::AlgebraError;
use crate::infra::utils::TextUtils;

/// Ordered symbol set; ordering keeps every derived output deterministic
pub type Set = BTreeSet<String>;

/// Group name -> symbols
pub type Groups = BTreeMap<String, Set>;

/// Reserved name of the lowest-precedence group
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// Conjunction operator inside a group descriptor
pub const CONJUNCTION: char = '^';

/// Delimiters accepted in the default-groups spec
pub const DEFAULT_SPEC_DELIMS: &str = ",;:";

/// Named symbol sets, explicit and derived
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    groups: Groups,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Set> {
        self.groups.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Set)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn as_map(&self) -> &Groups {
        &self.groups
    }

    /// Add `symbol` to `group`, creating the group if needed.
    /// Returns false when the symbol was already a member.
    pub fn add_member(&mut self, group: &str, symbol: &str) -> bool {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(symbol.to_string())
    }

    /// Bind `name` to `set`, replacing any previous binding
    pub fn insert(&mut self, name: impl Into<String>, set: Set) {
        self.groups.insert(name.into(), set);
    }

    /// Copy every group of `other` in; same-named entries are overwritten
    pub fn absorb(&mut self, other: &GroupTable) {
        for (name, set) in &other.groups {
            self.groups.insert(name.clone(), set.clone());
        }
    }

    /// Union of the groups listed in `spec` when all of them are known,
    /// otherwise the union of every known group.
    pub fn default_universe(&self, spec: Option<&str>) -> Set {
        if let Some(spec) = spec {
            let names = TextUtils::split_any(spec, DEFAULT_SPEC_DELIMS);
            if !names.is_empty() && names.iter().all(|n| self.groups.contains_key(*n)) {
                return names
                    .iter()
                    .flat_map(|n| self.groups[*n].iter().cloned())
                    .collect();
            }
        }
        self.groups.values().flatten().cloned().collect()
    }

    /// Resolve a group descriptor to its symbols.
    ///
    /// Known names return their set. A conjunction `A^B` returns A ∩ B and
    /// registers its derived siblings; an operand that is not a group acts
    /// as a singleton holding its own name. Anything else is an empty set
    /// and the caller treats the descriptor as a literal symbol.
    pub fn resolve(&mut self, name: &str) -> Result<Set, AlgebraError> {
        if let Some(set) = self.groups.get(name) {
            return Ok(set.clone());
        }
        if !name.contains(CONJUNCTION) {
            return Ok(Set::new());
        }

        let parts = TextUtils::split_any(name, "^");
        let [left_name, right_name] = parts.as_slice() else {
            return Err(AlgebraError::BadConjunction(name.to_string()));
        };
        let left = self.groups.get(*left_name).cloned();
        let right = self.groups.get(*right_name).cloned();
        if left.is_none() && right.is_none() {
            return Err(AlgebraError::UnknownOperands {
                left: left_name.to_string(),
                right: right_name.to_string(),
            });
        }
        let left = left.unwrap_or_else(|| Set::from([left_name.to_string()]));
        let right = right.unwrap_or_else(|| Set::from([right_name.to_string()]));

        let conj: Set = left.intersection(&right).cloned().collect();
        if !conj.is_empty() && conj != left && conj != right {
            self.groups.insert(name.to_string(), conj.clone());
        }

        // Only the left operand is checked here, so a union equal to the
        // right operand is still registered.
        let union: Set = left.union(&right).cloned().collect();
        if union != left {
            self.groups.insert(format!("({left_name}+{right_name})"), union);
        }

        let left_only: Set = left.difference(&right).cloned().collect();
        if !left_only.is_empty() && left_only != left {
            self.groups.insert(format!("({left_name}-{right_name})"), left_only);
        }

        let right_only: Set = right.difference(&left).cloned().collect();
        if !right_only.is_empty() && right_only != right {
            self.groups.insert(format!("({right_name}-{left_name})"), right_only);
        }

        trace!(expr = name, size = conj.len(), "evaluated conjunction");
        Ok(conj)
    }
}

/// Build a `Set` from string-like items
pub fn set_of<I, S>(items: I) -> Set
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
