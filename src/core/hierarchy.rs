//! Section hierarchy index for compound section descriptors.
//!
//! `online:account=3,strategy=2` is filed under header `online` with the
//! sorted parts `[account=3, strategy=2]`. When a key is missing from the
//! other snapshot, the index proposes related keys sharing the header: any
//! descriptor whose parts contain, or are contained in, the key's parts. The
//! most specific come first and the bare header comes last.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::core::store::SectionKey;
use crate::infra::utils::TextUtils;

/// descriptor text -> sorted qualifier parts
pub type Descriptors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIndex {
    headers: BTreeMap<String, Descriptors>,
}

/// Split `header:p1,p2` into the header and its sorted parts
pub fn parse_compound(section: &str) -> Option<(&str, &str, Vec<String>)> {
    let hp = TextUtils::split_any(section, ":");
    let [header, text] = hp.as_slice() else {
        return None;
    };
    let parts = TextUtils::split_any(text, ",")
        .into_iter()
        .map(str::to_string)
        .sorted()
        .collect();
    Some((*header, *text, parts))
}

/// `sub` ⊆ `sup`, both sorted
fn includes(sup: &[String], sub: &[String]) -> bool {
    let mut it = sup.iter();
    sub.iter().all(|s| it.any(|p| p == s))
}

impl SectionIndex {
    /// Index every observed descriptor with exactly one colon
    pub fn build<'a, I>(sections: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut idx = Self::default();
        for section in sections {
            if let Some((header, text, parts)) = parse_compound(section) {
                idx.headers
                    .entry(header.to_string())
                    .or_default()
                    .insert(text.to_string(), parts);
            }
        }
        idx
    }

    pub fn header(&self, header: &str) -> Option<&Descriptors> {
        self.headers.get(header)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Fallback keys for `key`, drawn from this index and `other`.
    ///
    /// Candidates are descriptors under the same header whose parts are a
    /// subset or a superset of the key's parts, ordered by descending part
    /// count; the bare header key always comes last. Non-compound keys have
    /// no fallbacks.
    pub fn fallbacks(&self, key: &SectionKey, other: &SectionIndex) -> Vec<SectionKey> {
        let Some((header, text, parts)) = parse_compound(&key.section) else {
            return Vec::new();
        };

        let mut candidates: BTreeSet<(usize, &str)> = BTreeSet::new();
        for idx in [self, other] {
            let Some(descs) = idx.headers.get(header) else {
                continue;
            };
            for (cand_text, cand_parts) in descs {
                let related = includes(&parts, cand_parts) || includes(cand_parts, &parts);
                if cand_text != text && related {
                    candidates.insert((cand_parts.len(), cand_text.as_str()));
                }
            }
        }

        let mut out: Vec<SectionKey> = candidates
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)))
            .map(|(_, t)| SectionKey::new(format!("{header}:{t}"), key.param.clone()))
            .collect();
        out.push(SectionKey::new(header, key.param.clone()));
        out
    }
}
