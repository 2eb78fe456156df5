//! `gcf groups FILE`: list every group a config tree defines or derives.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::{AppContext, GroupsArgs};
use crate::cli_ext::session;

pub fn run(args: GroupsArgs, ctx: &AppContext) -> Result<()> {
    let settings = session::settings(&args.resolve)?;
    let res = session::resolve(&args.file, &settings)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    res.render_groups_to(&mut out).context("Failed to write output")?;
    out.flush()?;

    session::report_warnings(res.warnings(), ctx);
    Ok(())
}
