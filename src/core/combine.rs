//! Post-load set combination.
//!
//! Registers the `DEFAULT` universe, then compares every pair of groups in
//! name order to derive extra groups (`A#B` for disjoint pairs, `A-B` when
//! B is strictly inside A) and prefix-based `PREFIX*` star groups.

use std::collections::BTreeMap;

use tracing::warn;

use crate::core::error::Warning;
use crate::core::groups::{DEFAULT_GROUP, GroupTable, Groups, Set};
use crate::infra::utils::TextUtils;

/// Shortest shared name prefix that forms a star group
pub const MIN_PREFIX_LEN: usize = 3;

/// Output of the combination pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination {
    pub extra: Groups,
    /// star group name -> names of the groups it unions
    pub stars: Groups,
    pub warnings: Vec<Warning>,
}

pub fn combine_sets(groups: &mut GroupTable, default_spec: Option<&str>) -> Combination {
    let universe = groups.default_universe(default_spec);
    if !universe.is_empty() {
        groups.insert(DEFAULT_GROUP, universe.clone());
    }

    let mut out = Combination::default();
    let mut prefixes: BTreeMap<String, Set> = BTreeMap::new();
    let entries: Vec<(&String, &Set)> =
        groups.iter().filter(|(name, _)| name.as_str() != DEFAULT_GROUP).collect();

    for (i, (n1, s1)) in entries.iter().enumerate() {
        for (n2, s2) in &entries[i + 1..] {
            if out.extra.contains_key(&format!("{n1}#{n2}")) {
                continue;
            }
            if s1 == s2 {
                if !n1.starts_with('(') && !n2.starts_with('(') {
                    warn!(first = %n1, second = %n2, "groups defined with same content");
                    out.warnings.push(Warning::DuplicateGroupContent {
                        first: n1.to_string(),
                        second: n2.to_string(),
                    });
                }
                continue;
            }

            let common: Set = s1.intersection(s2).cloned().collect();
            if common.is_empty() {
                let union: Set = s1.union(s2).cloned().collect();
                if union != universe {
                    out.extra.insert(format!("{n1}#{n2}"), union);
                }
            } else if common == **s2 {
                let diff: Set = s1.difference(s2).cloned().collect();
                if !diff.is_empty() && diff != **s1 {
                    out.extra.insert(format!("{n1}-{n2}"), diff);
                }
            } else if common == **s1 {
                let diff: Set = s2.difference(s1).cloned().collect();
                if !diff.is_empty() && diff != **s2 {
                    out.extra.insert(format!("{n2}-{n1}"), diff);
                }
            }

            let len = TextUtils::common_prefix_len(n1, n2);
            if len >= MIN_PREFIX_LEN {
                let bucket = prefixes.entry(n1[..len].to_string()).or_default();
                bucket.insert(n1.to_string());
                bucket.insert(n2.to_string());
            }
        }
    }

    for (prefix, names) in prefixes {
        let all: Set = names
            .iter()
            .filter_map(|n| groups.get(n))
            .flatten()
            .cloned()
            .collect();
        if all != universe {
            let star = format!("{prefix}*");
            out.extra.insert(star.clone(), all);
            out.stars.insert(star, names);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::groups::set_of;

    fn table(defs: &[(&str, &[&str])]) -> GroupTable {
        let mut t = GroupTable::new();
        for (name, members) in defs {
            t.insert(*name, set_of(members.iter().copied()));
        }
        t
    }

    #[test]
    fn default_universe_is_registered() {
        let mut t = table(&[("A", &["s1"]), ("B", &["s2"])]);
        combine_sets(&mut t, None);
        assert_eq!(t.get(DEFAULT_GROUP), Some(&set_of(["s1", "s2"])));
    }

    #[test]
    fn disjoint_pair_union_skipped_when_equal_to_universe() {
        let mut t = table(&[("A", &["s1"]), ("B", &["s2"]), ("C", &["s3"])]);
        let c = combine_sets(&mut t, None);
        assert_eq!(c.extra.get("A#B"), Some(&set_of(["s1", "s2"])));

        let mut t = table(&[("A", &["s1"]), ("B", &["s2"])]);
        let c = combine_sets(&mut t, None);
        assert!(!c.extra.contains_key("A#B"));
    }

    #[test]
    fn nested_pair_registers_difference() {
        let mut t = table(&[("ALL_X", &["s1", "s2", "s3"]), ("SOME", &["s1"]), ("Z", &["s9"])]);
        let c = combine_sets(&mut t, None);
        assert_eq!(c.extra.get("ALL_X-SOME"), Some(&set_of(["s2", "s3"])));
    }

    #[test]
    fn identical_explicit_groups_warn() {
        let mut t = table(&[("A", &["s1"]), ("B", &["s1"]), ("(A+B)", &["s1"])]);
        let c = combine_sets(&mut t, None);
        assert_eq!(
            c.warnings,
            vec![Warning::DuplicateGroupContent { first: "A".into(), second: "B".into() }]
        );
    }

    #[test]
    fn shared_prefix_forms_star_group() {
        let mut t = table(&[
            ("GROUP_1", &["s1"]),
            ("GROUP_2", &["s2"]),
            ("OTHER", &["s3"]),
        ]);
        let c = combine_sets(&mut t, None);
        assert_eq!(c.extra.get("GROUP_*"), Some(&set_of(["s1", "s2"])));
        assert_eq!(c.stars.get("GROUP_*"), Some(&set_of(["GROUP_1", "GROUP_2"])));
    }

    #[test]
    fn star_equal_to_universe_is_dropped() {
        let mut t = table(&[("GROUP_1", &["s1"]), ("GROUP_2", &["s2"])]);
        let c = combine_sets(&mut t, None);
        assert!(c.stars.is_empty());
    }

    #[test]
    fn default_spec_limits_universe() {
        let mut t = table(&[("A", &["s1"]), ("B", &["s2"]), ("C", &["s3"])]);
        combine_sets(&mut t, Some("A,B"));
        assert_eq!(t.get(DEFAULT_GROUP), Some(&set_of(["s1", "s2"])));
    }
}
