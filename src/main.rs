use anyhow::Result;
use clap::Parser;
use groupconf::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        verbose: cli.verbose,
    };
    init_tracing(&ctx);

    match cli.command {
        Commands::Show(args) => groupconf::show_run(args, &ctx),
        Commands::Diff(args) => groupconf::diff_run(args, &ctx),
        Commands::Groups(args) => groupconf::groups_run(args, &ctx),
        Commands::Init(args) => groupconf::infra::config::init(args, &ctx),
        Commands::Completions(args) => groupconf::completions_run(args, &ctx),
    }
}

/// Logs go to stderr; warnings are summarized by the commands themselves,
/// so library events stay hidden unless `-v` or `RUST_LOG` asks for them.
fn init_tracing(ctx: &AppContext) {
    let level = match (ctx.quiet, ctx.verbose) {
        (true, _) | (false, 0) => "error",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!ctx.no_color)
        .with_target(false)
        .init();
}
