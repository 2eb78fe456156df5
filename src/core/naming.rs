//! Readable names for arbitrary symbol sets.
//!
//! `describe` prefers, in order: an exact group, a name handed out earlier,
//! a short `A++B` join of the hint groups, an exact extra group, a near
//! match annotated with `+sym`/`-sym`, a long `++` join, a literal listing
//! for tiny sets, and finally a generated `GRP@<size>_<ADJ>_<NOUN>` label.
//! Every derived answer is cached so the same set keeps its name.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::groups::{Groups, Set};
use crate::infra::utils::TextUtils;

const ADJECTIVES: [&str; 10] =
    ["FAT", "BAD", "RED", "GREEN", "BLUE", "ODD", "MAD", "HAPPY", "SAD", "DRY"];
const NOUNS: [&str; 10] =
    ["CAT", "DOG", "COW", "APPLE", "DATE", "MOON", "SUN", "MAN", "BOY", "GIRL"];

/// Tolerances of the near-match search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    /// Maximum size distance (exclusive) for near matches and hint unions
    pub size_tolerance: usize,
    /// Joins with fewer parts than this beat extra groups and near matches
    pub max_joined_parts: usize,
    /// Sets smaller than this are listed literally instead of generated
    pub literal_limit: usize,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self { size_tolerance: 3, max_joined_parts: 4, literal_limit: 4 }
    }
}

/// Shuffled adjective/noun labels, cycling with a numeric suffix
#[derive(Debug, Clone)]
pub struct NameGenerator {
    combos: Vec<String>,
    counter: usize,
}

impl NameGenerator {
    /// Shuffle with `seed`, or with the thread RNG when `None`
    pub fn new(seed: Option<u64>) -> Self {
        let mut combos: Vec<String> = ADJECTIVES
            .iter()
            .flat_map(|a| NOUNS.iter().map(move |n| format!("{a}_{n}")))
            .collect();
        match seed {
            Some(s) => combos.shuffle(&mut StdRng::seed_from_u64(s)),
            None => combos.shuffle(&mut rand::rng()),
        }
        Self { combos, counter: 0 }
    }

    pub fn next_name(&mut self, size: usize) -> String {
        let round = self.counter / self.combos.len();
        let mut name = format!("GRP@{size}_{}", self.combos[self.counter % self.combos.len()]);
        self.counter += 1;
        if round > 0 {
            name.push_str(&format!("_{round}"));
        }
        name
    }
}

/// Per-instance naming caches
#[derive(Debug, Clone)]
pub struct Naming {
    pub policy: NamingPolicy,
    /// Derived names handed out so far
    pub seen: Groups,
    /// Synthesized names that belong in the trailer of a render
    pub custom: BTreeSet<String>,
    generator: NameGenerator,
}

impl Naming {
    pub fn new(policy: NamingPolicy, seed: Option<u64>) -> Self {
        Self { policy, seen: Groups::new(), custom: BTreeSet::new(), generator: NameGenerator::new(seed) }
    }

    fn remember(&mut self, name: String, target: &Set) -> String {
        self.seen.insert(name.clone(), target.clone());
        name
    }

    /// Name `target`, using the origin groups in `hints` as a combination
    /// candidate.
    pub fn describe(&mut self, target: &Set, hints: &Set, groups: &Groups, extra: &Groups) -> String {
        let tol = self.policy.size_tolerance;

        if let Some(name) = exact(groups, target) {
            return name;
        }
        if let Some(name) = exact(&self.seen, target) {
            return name;
        }

        let (joined, combined) = combine_hints(target, hints, groups, tol);
        let joined_name = TextUtils::join(&joined, "++");
        let combo_matches = !combined.is_empty() && combined == *target;

        if combo_matches && joined.len() < self.policy.max_joined_parts {
            return self.remember(joined_name, target);
        }
        if let Some(name) = exact(extra, target) {
            return self.remember(name, target);
        }

        let hypothetical = Groups::from([(joined_name.clone(), combined)]);
        for table in [groups, &hypothetical, extra] {
            if let Some(name) = near_match(table, target, tol) {
                return self.remember(name, target);
            }
        }

        if combo_matches {
            return self.remember(joined_name, target);
        }
        if target.len() < self.policy.literal_limit {
            return TextUtils::join(target, ",");
        }

        let name = self.generator.next_name(target.len());
        debug!(name = %name, size = target.len(), "generated group label");
        self.custom.insert(name.clone());
        self.remember(name, target)
    }
}

fn exact(table: &Groups, target: &Set) -> Option<String> {
    table.iter().find(|(_, set)| *set == target).map(|(name, _)| name.clone())
}

/// Union of the hint groups, abandoned once it cannot fit `target`
fn combine_hints(target: &Set, hints: &Set, groups: &Groups, tol: usize) -> (BTreeSet<String>, Set) {
    let mut names = BTreeSet::new();
    let mut combined = Set::new();
    for hint in hints {
        let Some(set) = groups.get(hint) else {
            continue;
        };
        if set.len() > target.len() + tol {
            return (BTreeSet::new(), Set::new());
        }
        names.insert(hint.clone());
        combined.extend(set.iter().cloned());
        if combined.len() > target.len() + tol {
            return (BTreeSet::new(), Set::new());
        }
    }
    (names, combined)
}

/// First group within `tol` of `target`, annotated with the difference
fn near_match(table: &Groups, target: &Set, tol: usize) -> Option<String> {
    for (name, set) in table {
        if set.is_empty() || target.len().abs_diff(set.len()) >= tol {
            continue;
        }
        let missing: Vec<&String> = set.difference(target).collect();
        let added: Vec<&String> = target.difference(set).collect();
        if missing.is_empty() && added.is_empty() {
            continue;
        }
        if added.is_empty() && missing.len() < tol {
            return Some(missing.iter().fold(name.clone(), |acc, s| format!("{acc}-{s}")));
        }
        if missing.is_empty() && added.len() < tol {
            return Some(added.iter().fold(name.clone(), |acc, s| format!("{acc}+{s}")));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::groups::set_of;

    fn groups(defs: &[(&str, &[&str])]) -> Groups {
        defs.iter().map(|(n, m)| (n.to_string(), set_of(m.iter().copied()))).collect()
    }

    fn naming() -> Naming {
        Naming::new(NamingPolicy::default(), Some(7))
    }

    #[test]
    fn exact_group_wins() {
        let g = groups(&[("FAST", &["s1", "s2"])]);
        let mut n = naming();
        assert_eq!(n.describe(&set_of(["s1", "s2"]), &Set::new(), &g, &Groups::new()), "FAST");
        assert!(n.seen.is_empty());
    }

    #[test]
    fn hint_groups_join_when_union_matches() {
        let g = groups(&[("A", &["s1", "s2"]), ("B", &["s3", "s4"])]);
        let mut n = naming();
        let target = set_of(["s1", "s2", "s3", "s4"]);
        assert_eq!(n.describe(&target, &set_of(["A", "B"]), &g, &Groups::new()), "A++B");
        assert_eq!(n.seen.get("A++B"), Some(&target));
    }

    #[test]
    fn long_hint_join_is_used_after_other_candidates() {
        let g = groups(&[("A", &["s1"]), ("B", &["s2"]), ("C", &["s3"]), ("D", &["s4"])]);
        let mut n = naming();
        let target = set_of(["s1", "s2", "s3", "s4"]);
        let name = n.describe(&target, &set_of(["A", "B", "C", "D"]), &g, &Groups::new());
        assert_eq!(name, "A++B++C++D");
        assert!(n.custom.is_empty());
    }

    #[test]
    fn hint_union_stops_past_size_tolerance() {
        let target = set_of(["s1", "s2"]);
        let at_limit = groups(&[("BIG", &["s1", "s2", "s3", "s4", "s5"])]);
        let (names, combined) = combine_hints(&target, &set_of(["BIG"]), &at_limit, 3);
        assert_eq!(names, set_of(["BIG"]));
        assert_eq!(combined.len(), 5);

        let over = groups(&[("BIG", &["s1", "s2", "s3", "s4", "s5", "s6"])]);
        let (names, combined) = combine_hints(&target, &set_of(["BIG"]), &over, 3);
        assert!(names.is_empty() && combined.is_empty());

        // each hint fits, the union does not
        let split = groups(&[("L", &["s1", "s2", "s3"]), ("R", &["s4", "s5", "s6"])]);
        let (names, _) = combine_hints(&target, &set_of(["L", "R"]), &split, 3);
        assert!(names.is_empty());
    }

    #[test]
    fn extra_group_matches_exactly() {
        let g = groups(&[("A", &["s1"]), ("B", &["s2"])]);
        let extra = groups(&[("A#B", &["s1", "s2"])]);
        let mut n = naming();
        assert_eq!(n.describe(&set_of(["s1", "s2"]), &Set::new(), &g, &extra), "A#B");
    }

    #[test]
    fn near_match_annotates_missing_and_added_symbols() {
        let g = groups(&[("BIG", &["a", "b", "c", "d", "e"])]);
        let mut n = naming();
        assert_eq!(
            n.describe(&set_of(["a", "b", "c", "d"]), &Set::new(), &g, &Groups::new()),
            "BIG-e"
        );
        assert_eq!(
            n.describe(&set_of(["a", "b", "c", "d", "e", "f"]), &Set::new(), &g, &Groups::new()),
            "BIG+f"
        );
    }

    #[test]
    fn near_match_respects_size_tolerance_boundary() {
        let g = groups(&[("BIG", &["a", "b", "c", "d", "e", "f"])]);
        let mut n = naming();
        // two short of BIG: within tolerance
        assert_eq!(
            n.describe(&set_of(["a", "b", "c", "d"]), &Set::new(), &g, &Groups::new()),
            "BIG-e-f"
        );
        // three short: exactly at tolerance, no near match
        let name = n.describe(&set_of(["a", "b", "c"]), &Set::new(), &g, &Groups::new());
        assert_eq!(name, "a,b,c");
        let name = n.describe(&set_of(["x", "y", "z", "w"]), &Set::new(), &g, &Groups::new());
        assert!(name.starts_with("GRP@4_"), "got {name}");
        assert!(n.custom.contains(&name));
    }

    #[test]
    fn repeated_describe_is_served_from_cache() {
        let mut n = naming();
        let target = set_of(["p", "q", "r", "s", "t"]);
        let first = n.describe(&target, &Set::new(), &Groups::new(), &Groups::new());
        let grown = groups(&[("OTHER", &["p", "q", "r", "s", "t", "u"])]);
        let second = n.describe(&target, &Set::new(), &Groups::new(), &grown);
        assert_eq!(first, second);
    }

    #[test]
    fn generator_cycles_with_suffix() {
        let mut g = NameGenerator::new(Some(1));
        let first = g.next_name(5);
        for _ in 1..100 {
            g.next_name(5);
        }
        let wrapped = g.next_name(5);
        assert_eq!(wrapped, format!("{first}_1"));
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = NameGenerator::new(Some(42));
        let mut b = NameGenerator::new(Some(42));
        assert_eq!(a.next_name(3), b.next_name(3));
    }
}
