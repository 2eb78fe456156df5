//! `gcf show FILE`: print the effective settings of a config tree.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::instrument;

use crate::cli::{AppContext, ShowArgs};
use crate::cli_ext::session;

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(args: ShowArgs, ctx: &AppContext) -> Result<()> {
    let settings = session::settings(&args.resolve)?;
    let mut res = session::resolve(&args.file, &settings)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &res.json_rows()).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        res.render_to(&mut out).context("Failed to write output")?;
    }
    out.flush()?;

    session::report_warnings(res.warnings(), ctx);
    Ok(())
}
