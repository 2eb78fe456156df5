//! `gcf diff OLD NEW`: semantic differences between two config trees.
//!
//! The forward pass reports what OLD sets that NEW drops or changes; the
//! reverse pass adds what only NEW sets. Both are merged into one result
//! rendered with OLD's group names.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::cli::{AppContext, DiffArgs};
use crate::cli_ext::session;
use crate::core::resolver::Resolution;

/// Forward diff, optionally completed by the reverse pass
pub fn compare(old: &Resolution, new: &Resolution, one_way: bool) -> Resolution {
    let mut cmp = old.diff(new, false);
    if !one_way {
        let reverse = new.diff(old, true);
        debug!(keys = reverse.store().entries().len(), "reverse pass");
        cmp.merge_store(reverse.store());
        for w in reverse.warnings() {
            cmp.push_warning(w.clone());
        }
    }
    cmp
}

#[instrument(skip_all, fields(old = %args.old.display(), new = %args.new.display()))]
pub fn run(args: DiffArgs, ctx: &AppContext) -> Result<()> {
    let settings = session::settings(&args.resolve)?;
    let old = session::resolve(&args.old, &settings)?;
    let new = session::resolve(&args.new, &settings)?;

    let mut cmp = compare(&old, &new, args.one_way);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cmp.render_to(&mut out).context("Failed to write output")?;
    out.flush()?;

    session::report_warnings(
        old.warnings()
            .iter()
            .chain(new.warnings())
            .chain(cmp.warnings()),
        ctx,
    );

    if args.exit_code && !cmp.store().is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
