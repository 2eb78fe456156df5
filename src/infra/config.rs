use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs, ResolveFlags};
use crate::core::diff::KvSeps;
use crate::core::naming::NamingPolicy;
use crate::core::resolver::ResolveOptions;

/// Config files looked up in the working directory, first hit wins
pub const CONFIG_PATHS: [&str; 5] =
    ["groupconf.toml", "groupconf.yaml", "groupconf.json", ".groupconf.toml", ".groupconf.yaml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings
{
    /// Groups whose union forms the DEFAULT universe (e.g. "GROUP_A,GROUP_B")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_groups: Option<String>,

    /// List separators for value diffs ("ALL," or "types,venues;")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kvseps: Option<String>,

    /// Prefix for every rendered line
    pub display_prefix: String,

    /// Extra directories searched for #include references
    pub include_paths: Vec<PathBuf>,

    /// Globs of #include references treated as empty files
    pub ignore_patterns: Vec<String>,

    /// Seed for generated group labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Group naming tolerances
    pub naming: NamingPolicy,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            default_groups: None,
            kvseps: None,
            display_prefix: String::new(),
            include_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            seed: None,
            naming: NamingPolicy::default(),
        }
    }
}

impl Settings
{
    /// Apply command-line flags on top of the loaded layers
    pub fn with_flags(
        mut self,
        flags: &ResolveFlags,
    ) -> Self
    {
        if let Some(groups) = &flags.default_groups
        {
            self.default_groups = Some(groups.clone());
        }

        if let Some(seps) = &flags.kvseps
        {
            self.kvseps = Some(seps.clone());
        }

        if let Some(prefix) = &flags.prefix
        {
            self.display_prefix = prefix.clone();
        }

        if flags.seed.is_some()
        {
            self.seed = flags.seed;
        }

        // Flag paths are searched before configured ones
        let mut paths = flags
            .include_paths
            .clone();
        paths.append(&mut self.include_paths);
        self.include_paths = paths;

        self.ignore_patterns
            .extend(flags.ignore.iter().cloned());

        self
    }

    /// Options handed to the resolver
    pub fn resolve_options(&self) -> Result<ResolveOptions>
    {
        let kv_seps = match &self.kvseps
        {
            Some(spec) => KvSeps::parse(spec).context("Invalid kvseps setting")?,
            None => KvSeps::default(),
        };

        Ok(ResolveOptions {
            default_groups: self
                .default_groups
                .clone(),
            kv_seps,
            display_prefix: self
                .display_prefix
                .clone(),
            naming: self.naming,
            seed: self.seed,
        })
    }
}

/// Load settings: defaults, then the first config file found, then
/// `GROUPCONF_*` variables, then the bare `DEFAULT`, `KVSEPS` and
/// `DISPLAY_PREFIX` variables.
pub fn load_settings() -> Result<Settings>
{
    let mut builder = config::Config::builder();

    for path in &CONFIG_PATHS
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // GROUPCONF_DISPLAY_PREFIX, GROUPCONF_NAMING__SIZE_TOLERANCE, ...
    builder = builder.add_source(
        config::Environment::with_prefix("GROUPCONF")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("include_paths")
            .with_list_parse_key("ignore_patterns"),
    );

    builder = builder
        .set_override_option("default_groups", std::env::var("DEFAULT").ok())
        .context("Failed to apply DEFAULT")?
        .set_override_option("kvseps", std::env::var("KVSEPS").ok())
        .context("Failed to apply KVSEPS")?
        .set_override_option("display_prefix", std::env::var("DISPLAY_PREFIX").ok())
        .context("Failed to apply DISPLAY_PREFIX")?;

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Settings = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_PATHS[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let settings = Settings::default();
    let toml_string =
        toml::to_string_pretty(&settings).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_settings_round_trip_through_toml()
    {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults()
    {
        let s: Settings = toml::from_str("display_prefix = \"# \"\n[naming]\nsize_tolerance = 2\n").unwrap();
        assert_eq!(s.display_prefix, "# ");
        assert_eq!(s.naming.size_tolerance, 2);
        assert_eq!(s.naming.literal_limit, NamingPolicy::default().literal_limit);
        assert!(s.include_paths.is_empty());
    }

    #[test]
    fn flags_override_loaded_values()
    {
        let base = Settings {
            default_groups: Some("A".into()),
            include_paths: vec![PathBuf::from("shared")],
            ..Settings::default()
        };
        let flags = ResolveFlags {
            default_groups: Some("B,C".into()),
            include_paths: vec![PathBuf::from("local")],
            seed: Some(9),
            ..ResolveFlags::default()
        };

        let s = base.with_flags(&flags);
        assert_eq!(s.default_groups.as_deref(), Some("B,C"));
        assert_eq!(s.include_paths, vec![PathBuf::from("local"), PathBuf::from("shared")]);
        assert_eq!(s.seed, Some(9));
    }

    #[test]
    fn bad_kvseps_fails_option_building()
    {
        let s = Settings { kvseps: Some(",oops".into()), ..Settings::default() };
        assert!(s.resolve_options().is_err());
    }
}
