//! Recursive include resolution.
//!
//! `Loader` reads one config file line by line, follows `#include`
//! directives depth-first, and folds every child into the caller: child
//! groups overwrite same-named parent groups, child settings are replayed
//! through the override-aware store merge. Once the stream ends the
//! instance is post-processed (set combination, section index) and becomes
//! read-only apart from its naming caches.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace, warn};

use crate::core::combine::combine_sets;
use crate::core::diff::KvSeps;
use crate::core::error::{Location, ResolveError, Warning};
use crate::core::groups::{DEFAULT_GROUP, GroupTable, Groups, Set};
use crate::core::hierarchy::SectionIndex;
use crate::core::line::{Line, classify};
use crate::core::naming::{Naming, NamingPolicy};
use crate::core::store::{SectionKey, Store};
use crate::infra::paths::PathService;
use crate::infra::utils::TextUtils;

/// Ancestor count above which an include chain is reported as suspicious
pub const MAX_INCLUDE_DEPTH: usize = 100;

/// Knobs shared by every instance of one run
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Group names forming the `DEFAULT` universe (`,`/`;`/`:` separated)
    pub default_groups: Option<String>,
    pub kv_seps: KvSeps,
    /// Prepended to every rendered line
    pub display_prefix: String,
    pub naming: NamingPolicy,
    /// Seed for generated group labels; random when unset
    pub seed: Option<u64>,
}

/// Fully resolved config: groups, store, section index and naming caches
#[derive(Debug, Clone)]
pub struct Resolution {
    pub(crate) groups: GroupTable,
    pub(crate) store: Store,
    pub(crate) sections: BTreeSet<String>,
    pub(crate) index: SectionIndex,
    pub(crate) extra: Groups,
    pub(crate) stars: Groups,
    pub(crate) naming: Naming,
    pub(crate) options: ResolveOptions,
    pub(crate) warnings: Vec<Warning>,
}

impl Resolution {
    pub fn empty(options: ResolveOptions) -> Self {
        Self {
            groups: GroupTable::new(),
            store: Store::new(),
            sections: BTreeSet::new(),
            index: SectionIndex::default(),
            extra: Groups::new(),
            stars: Groups::new(),
            naming: Naming::new(options.naming, options.seed),
            options,
            warnings: Vec::new(),
        }
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    /// Pairwise and prefix combinations from the post-load pass
    pub fn extra_groups(&self) -> &Groups {
        &self.extra
    }

    /// Star group name -> names of the groups it unions
    pub fn star_groups(&self) -> &Groups {
        &self.stars
    }

    pub fn custom_names(&self) -> &BTreeSet<String> {
        &self.naming.custom
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Readable, cached name for `target`; `hints` are candidate origin groups
    pub fn describe(&mut self, target: &Set, hints: &Set) -> String {
        self.naming.describe(target, hints, self.groups.as_map(), &self.extra)
    }

    /// Fold another store in with override precedence, e.g. a second diff pass
    pub fn merge_store(&mut self, other: &Store) {
        self.store.merge(other);
    }

    pub(crate) fn push_warning(&mut self, warning: Warning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    fn absorb(&mut self, child: Resolution) {
        self.groups.absorb(&child.groups);
        // after groups: the child's origins refer to them
        self.store.merge(&child.store);
        self.sections.extend(child.sections);
        for w in child.warnings {
            self.push_warning(w);
        }
    }

    /// Propagation of narrower compound-section overrides to broader
    /// sections sharing a header. Currently has nothing to propagate.
    fn trickle_down(&mut self) {}

    fn finish(&mut self) {
        self.trickle_down();

        let combo = combine_sets(&mut self.groups, self.options.default_groups.as_deref());
        self.extra = combo.extra;
        for star in combo.stars.keys() {
            self.naming.custom.insert(star.clone());
        }
        self.stars = combo.stars;
        for w in combo.warnings {
            self.push_warning(w);
        }

        self.index = SectionIndex::build(&self.sections);
    }
}

/// Drives resolution of a file tree through a path service
pub struct Loader<'a> {
    paths: &'a dyn PathService,
    options: ResolveOptions,
}

impl<'a> Loader<'a> {
    pub fn new(paths: &'a dyn PathService, options: ResolveOptions) -> Self {
        Self { paths, options }
    }

    /// Resolve `reference` and everything it includes
    #[instrument(skip(self))]
    pub fn load(&self, reference: &str) -> Result<Resolution, ResolveError> {
        self.load_with_ancestors(reference, &BTreeSet::new())
    }

    /// Resolve in-memory `text` as if it were the file `name`
    pub fn load_text(&self, name: &str, text: &str) -> Result<Resolution, ResolveError> {
        let mut res = Resolution::empty(self.options.clone());
        let path = PathBuf::from(name);
        self.parse_into(&mut res, &path, text, &BTreeSet::new())?;
        Ok(res)
    }

    fn load_with_ancestors(
        &self,
        reference: &str,
        ancestors: &BTreeSet<PathBuf>,
    ) -> Result<Resolution, ResolveError> {
        let mut res = Resolution::empty(self.options.clone());
        if self.paths.ignore(reference) {
            debug!(reference, "ignored include");
            return Ok(res);
        }

        let path = self.paths.locate(reference);
        if ancestors.contains(&path) {
            return Err(ResolveError::CircularInclude { path });
        }
        if ancestors.len() > MAX_INCLUDE_DEPTH {
            warn!(path = %path.display(), depth = ancestors.len(), "suspicious include depth");
            res.push_warning(Warning::DeepInclude { path: path.clone(), depth: ancestors.len() });
        }

        let text = fs::read_to_string(&path)
            .map_err(|source| ResolveError::Unreadable { path: path.clone(), source })?;
        debug!(path = %path.display(), lines = text.lines().count(), "loading");

        self.parse_into(&mut res, &path, &text, ancestors)?;
        Ok(res)
    }

    fn parse_into(
        &self,
        res: &mut Resolution,
        path: &Path,
        text: &str,
        ancestors: &BTreeSet<PathBuf>,
    ) -> Result<(), ResolveError> {
        // open #groupdef name and where it started
        let mut open: Option<(String, Location)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let Some(line) = classify(raw) else {
                continue;
            };
            let at = Location::new(path, idx + 1);
            trace!(%at, ?line, "classified");

            match line {
                Line::Include(arg) => {
                    if let Some((group, _)) = &open {
                        return Err(ResolveError::IncludeInGroupDef {
                            at,
                            group: group.clone(),
                            text: raw.to_string(),
                        });
                    }
                    if arg.is_empty() {
                        return Err(ResolveError::EmptyInclude { at, text: raw.to_string() });
                    }
                    let mut chain = ancestors.clone();
                    chain.insert(path.to_path_buf());
                    debug!(%at, include = arg, "following include");
                    let child = self.load_with_ancestors(arg, &chain)?;
                    res.absorb(child);
                }
                Line::GroupDef(arg) => {
                    if let Some((group, _)) = &open {
                        return Err(ResolveError::NestedGroupDef {
                            at,
                            open: group.clone(),
                            text: raw.to_string(),
                        });
                    }
                    match TextUtils::words(arg).as_slice() {
                        [] => {
                            return Err(ResolveError::MissingGroupName { at, text: raw.to_string() });
                        }
                        [name] => open = Some((name.to_string(), at)),
                        _ => {
                            return Err(ResolveError::MultiWordGroupName {
                                at,
                                text: raw.to_string(),
                            });
                        }
                    }
                }
                Line::EndGroupDef => {
                    if open.take().is_none() {
                        return Err(ResolveError::UnmatchedEndGroupDef { at, text: raw.to_string() });
                    }
                }
                Line::Data(data) => match &open {
                    Some((group, _)) => add_member(res, group, data, at, raw)?,
                    None => record_line(res, data, at, raw)?,
                },
            }
        }

        if let Some((group, at)) = open {
            return Err(ResolveError::UnterminatedGroupDef { at, group });
        }

        res.finish();
        Ok(())
    }
}

fn add_member(
    res: &mut Resolution,
    group: &str,
    data: &str,
    at: Location,
    raw: &str,
) -> Result<(), ResolveError> {
    if TextUtils::words(data).len() > 1 {
        return Err(ResolveError::MultiTokenMember {
            at,
            group: group.to_string(),
            text: raw.to_string(),
        });
    }
    if !res.groups.add_member(group, data) {
        warn!(%at, group, symbol = data, "duplicate group element");
        res.push_warning(Warning::DuplicateMember {
            at,
            group: group.to_string(),
            symbol: data.to_string(),
        });
    }
    Ok(())
}

/// `section-spec group-descriptor key=value [key=value ...]`
fn record_line(res: &mut Resolution, data: &str, at: Location, raw: &str) -> Result<(), ResolveError> {
    let words = TextUtils::words(data);
    let [section, descriptor, pairs @ ..] = words.as_slice() else {
        return Err(ResolveError::TooFewParts { at, text: raw.to_string() });
    };
    if pairs.is_empty() {
        return Err(ResolveError::TooFewParts { at, text: raw.to_string() });
    }

    let mut assignments = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match pair.find('=') {
            Some(eq) if eq > 0 && eq + 1 < pair.len() => {
                assignments.push((&pair[..eq], &pair[eq + 1..]));
            }
            _ => {
                return Err(ResolveError::BadKeyValue {
                    at,
                    pair: pair.to_string(),
                    text: raw.to_string(),
                });
            }
        }
    }

    let mut symbols = if *descriptor == DEFAULT_GROUP && !res.groups.contains(DEFAULT_GROUP) {
        res.groups.default_universe(res.options.default_groups.as_deref())
    } else {
        res.groups
            .resolve(descriptor)
            .map_err(|source| ResolveError::Algebra { at: at.clone(), source })?
    };
    if symbols.is_empty() {
        symbols.insert(descriptor.to_string());
    }

    res.sections.insert(section.to_string());
    for (param, value) in assignments {
        let key = SectionKey::new(*section, param);
        for symbol in &symbols {
            res.store.record(&key, symbol, value, descriptor);
        }
    }
    Ok(())
}
