//! Shared plumbing for the resolving commands: settings, path lookup,
//! loading, and the warning summary on stderr.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli::{AppContext, ResolveFlags};
use crate::core::error::Warning;
use crate::core::resolver::{Loader, Resolution};
use crate::infra::config::{Settings, load_settings};
use crate::infra::paths::FsPathFinder;

/// Layered settings with the command's flags applied last
pub fn settings(flags: &ResolveFlags) -> Result<Settings> {
    Ok(load_settings()?.with_flags(flags))
}

/// Resolve `file` and everything it includes
pub fn resolve(file: &Path, settings: &Settings) -> Result<Resolution> {
    let options = settings.resolve_options()?;
    let finder = FsPathFinder::for_root(file, &settings.include_paths, &settings.ignore_patterns)
        .context("Invalid ignore pattern")?;

    let reference = file.to_string_lossy();
    let res = Loader::new(&finder, options)
        .load(&reference)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;

    info!(
        file = %file.display(),
        groups = res.groups().len(),
        keys = res.store().entries().len(),
        "resolved"
    );
    Ok(res)
}

/// Print collected warnings to stderr unless `--quiet`
pub fn report_warnings<'a>(warnings: impl IntoIterator<Item = &'a Warning>, ctx: &AppContext) {
    if ctx.quiet {
        return;
    }
    for w in warnings {
        if ctx.no_color {
            eprintln!("warning: {w}");
        } else {
            eprintln!("{} {w}", "warning:".yellow());
        }
    }
}
