//! Output of a resolved (or diff) configuration.
//!
//! The text form is one block per section and group label:
//!
//! ```text
//! online   FAST  enable=true
//! online   s3    enable=false
//!
//! > 'GRP@5_RED_CAT': s1,s2,s3,s4,s5
//! ```
//!
//! Labels come from `Resolution::describe`; generated labels are expanded in
//! the trailer.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;
use tracing::warn;

use crate::core::error::Warning;
use crate::core::groups::Set;
use crate::core::resolver::Resolution;
use crate::infra::utils::TextUtils;

/// Upper bound for the group label column
pub const MAX_LABEL_WIDTH: usize = 30;

/// One (section, parameter, value) entry with the symbols holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRow {
    pub section: String,
    pub param: String,
    pub value: String,
    pub symbols: Vec<String>,
}

/// section -> label -> param -> value
type Table = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

impl Resolution {
    /// Write the text form to `out`. Unused generated names are recorded as
    /// warnings.
    pub fn render_to<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let prefix = self.options.display_prefix.clone();

        let mut rows = Vec::new();
        for (key, values) in self.store.entries() {
            for (value, holders) in values {
                let symbols: Set = holders.keys().cloned().collect();
                let origins: Set = holders.values().cloned().collect();
                rows.push((key.clone(), value.clone(), symbols, origins));
            }
        }

        let mut table = Table::new();
        let mut section_width = 0;
        let mut label_width = 0;
        for (key, value, symbols, origins) in rows {
            let label = self.describe(&symbols, &origins);
            section_width = section_width.max(key.section.chars().count());
            label_width = label_width.max(label.chars().count());
            table
                .entry(key.section)
                .or_default()
                .entry(label)
                .or_default()
                .insert(key.param, value);
        }
        let label_width = label_width.min(MAX_LABEL_WIDTH);

        for (section, labels) in &table {
            for (label, params) in labels {
                write!(out, "{prefix}{section:<section_width$}  {label:<label_width$}")?;
                for (param, value) in params {
                    write!(out, "  {param}={value}")?;
                }
                writeln!(out)?;
            }
        }

        let mut first = true;
        let custom: Vec<String> = self.naming.custom.iter().cloned().collect();
        for name in custom {
            let Some(symbols) = self.naming.seen.get(&name) else {
                // unused star groups are dropped silently
                if !self.stars.contains_key(&name) {
                    warn!(%name, "custom group name never used");
                    self.push_warning(Warning::UnusedCustomName { name });
                }
                continue;
            };
            // star groups list their component groups, generated labels their symbols
            let members = self.stars.get(&name).unwrap_or(symbols).clone();
            if first {
                writeln!(out)?;
                first = false;
            }
            writeln!(out, "{prefix}> '{name}': {}", TextUtils::join(&members, ","))?;
        }
        Ok(())
    }

    /// Text form as a string
    pub fn render(&mut self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Flat, label-free view of the store for machine consumption
    pub fn json_rows(&self) -> Vec<JsonRow> {
        self.store
            .entries()
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |(value, holders)| JsonRow {
                    section: key.section.clone(),
                    param: key.param.clone(),
                    value: value.clone(),
                    symbols: holders.keys().cloned().collect(),
                })
            })
            .collect()
    }

    /// Every defined, derived and combined group with its members
    pub fn render_groups_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let prefix = &self.options.display_prefix;
        let sections: [(&str, Box<dyn Iterator<Item = (&String, &Set)> + '_>); 3] = [
            ("groups", Box::new(self.groups.iter())),
            ("combined", Box::new(self.extra.iter().filter(|(n, _)| !self.stars.contains_key(*n)))),
            ("star", Box::new(self.stars.iter())),
        ];
        for (title, entries) in sections {
            let entries: Vec<_> = entries.collect();
            if entries.is_empty() {
                continue;
            }
            writeln!(out, "{prefix}[{title}]")?;
            for (name, members) in entries {
                writeln!(out, "{prefix}{name}: {}", TextUtils::join(members, ","))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::naming::NamingPolicy;
    use crate::core::resolver::{Loader, ResolveOptions};
    use crate::infra::paths::FsPathFinder;

    fn resolve(text: &str) -> Resolution {
        let paths = FsPathFinder::new(&[]).unwrap();
        let options = ResolveOptions { seed: Some(3), naming: NamingPolicy::default(), ..Default::default() };
        Loader::new(&paths, options).load_text("main.gcf", text).unwrap()
    }

    #[test]
    fn group_and_literal_labels_are_aligned() {
        let mut res = resolve(
            "#groupdef FAST\ns1\ns2\n#endgroupdef\n#groupdef SLOW\ns3\n#endgroupdef\n\
             online FAST enable=true\nonline s3 enable=false\n",
        );
        assert_eq!(
            res.render(),
            "online  FAST  enable=true\nonline  SLOW  enable=false\n"
        );
    }

    #[test]
    fn params_sharing_a_label_print_on_one_line() {
        let mut res = resolve("online s1 limit=10 venue=X\n");
        assert_eq!(res.render(), "online  s1  limit=10  venue=X\n");
    }

    #[test]
    fn display_prefix_starts_every_line() {
        let paths = FsPathFinder::new(&[]).unwrap();
        let options = ResolveOptions { display_prefix: "| ".into(), ..Default::default() };
        let mut res = Loader::new(&paths, options)
            .load_text("main.gcf", "a s1 x=1\nbb s1 x=2\n")
            .unwrap();
        assert_eq!(res.render(), "| a   s1  x=1\n| bb  s1  x=2\n");
    }

    #[test]
    fn generated_label_is_expanded_in_trailer() {
        let mut res = resolve("online s1 x=1\nonline s2 x=1\nonline s3 x=1\nonline s4 x=1\n");
        let out = res.render();
        let mut lines = out.lines();
        let first = lines.next().unwrap();
        assert!(first.starts_with("online  GRP@4_"), "{out}");
        assert_eq!(lines.next(), Some(""));
        let trailer = lines.next().unwrap();
        assert!(trailer.starts_with("> 'GRP@4_"));
        assert!(trailer.ends_with("': s1,s2,s3,s4"), "{trailer}");
    }

    #[test]
    fn unused_star_group_is_left_out_silently() {
        let mut res = resolve(
            "#groupdef GROUP_1\ns1\n#endgroupdef\n#groupdef GROUP_2\ns2\n#endgroupdef\n\
             #groupdef OTHER\ns3\n#endgroupdef\nonline OTHER x=1\n",
        );
        assert!(res.star_groups().contains_key("GROUP_*"));
        assert_eq!(res.render(), "online  OTHER  x=1\n");
        assert!(res.warnings().is_empty());
    }

    #[test]
    fn used_star_group_lists_components() {
        let mut res = resolve(
            "#groupdef GROUP_1\ns1\n#endgroupdef\n#groupdef GROUP_2\ns2\n#endgroupdef\n\
             #groupdef OTHER\ns3\n#endgroupdef\nonline s1 x=1\nonline s2 x=1\n",
        );
        let out = res.render();
        assert!(out.starts_with("online  GROUP_*  x=1\n"), "{out}");
        assert!(out.ends_with("\n> 'GROUP_*': GROUP_1,GROUP_2\n"), "{out}");
    }

    #[test]
    fn unused_generated_name_is_a_warning() {
        let mut res = resolve("online s1 x=1\n");
        res.naming.custom.insert("GRP@9_ODD_SUN".into());
        assert_eq!(res.render(), "online  s1  x=1\n");
        assert_eq!(
            res.warnings(),
            &[Warning::UnusedCustomName { name: "GRP@9_ODD_SUN".into() }]
        );
    }

    #[test]
    fn json_rows_list_symbols_per_value() {
        let res = resolve("online s1 x=1\nonline s2 x=1\n");
        assert_eq!(
            res.json_rows(),
            vec![JsonRow {
                section: "online".into(),
                param: "x".into(),
                value: "1".into(),
                symbols: vec!["s1".into(), "s2".into()],
            }]
        );
    }
}
