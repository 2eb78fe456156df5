//! `gcf completions`: shell completion scripts for the `gcf` binary.

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use clap_complete::{Generator, Shell as Target};
use tracing::debug;

use crate::cli::{AppContext, Cli, CompletionsArgs, Shell};

const BIN_NAME: &str = "gcf";

fn target(shell: &Shell) -> Target {
    match shell {
        Shell::Bash => Target::Bash,
        Shell::Zsh => Target::Zsh,
        Shell::Fish => Target::Fish,
        Shell::PowerShell => Target::PowerShell,
        Shell::Elvish => Target::Elvish,
    }
}

/// Completion script for `shell`, built from the current `Cli` definition
pub fn script(shell: &Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(target(shell), &mut cmd, BIN_NAME, &mut buf);
    buf
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    let body = script(&args.shell);

    if args.stdout {
        let mut out = io::stdout().lock();
        out.write_all(&body)?;
        return out.flush().context("Failed to write completion script");
    }

    let Some(dir) = args.out_dir else {
        bail!("--out-dir is required unless --stdout is set");
    };
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(target(&args.shell).file_name(BIN_NAME));
    fs::write(&path, &body).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = body.len(), "completion written");

    if !ctx.quiet {
        eprintln!("Wrote completion to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_name_the_binary_and_its_commands() {
        let bash = String::from_utf8(script(&Shell::Bash)).unwrap();
        assert!(bash.contains("gcf"));
        assert!(bash.contains("diff"));
        assert!(!script(&Shell::Fish).is_empty());
    }

    #[test]
    fn out_dir_receives_shell_specific_file() {
        let tmp = tempfile::tempdir().unwrap();
        let args = CompletionsArgs { shell: Shell::Zsh, out_dir: Some(tmp.path().to_path_buf()), stdout: false };
        run(args, &AppContext { quiet: true, ..Default::default() }).unwrap();
        assert!(tmp.path().join("_gcf").is_file());
    }

    #[test]
    fn missing_destination_is_an_error() {
        let args = CompletionsArgs { shell: Shell::Bash, out_dir: None, stdout: false };
        assert!(run(args, &AppContext::default()).is_err());
    }
}
