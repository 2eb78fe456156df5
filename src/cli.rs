use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub verbose: u8,    // global -v, repeatable
}

#[derive(Parser)]
#[command(name = "gcf")]
#[command(about = "Resolve, merge and semantically diff group-based configuration files")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress warnings and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a config file and print the effective settings
    Show(ShowArgs),

    /// Show what changed between two config files
    Diff(DiffArgs),

    /// List defined, derived and combined groups
    Groups(GroupsArgs),

    /// Initialize a groupconf.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Resolution knobs shared by every command that reads config files
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveFlags {
    /// Groups forming the DEFAULT universe (comma, semicolon or colon separated)
    #[arg(long = "default", value_name = "GROUPS")]
    pub default_groups: Option<String>,

    /// List separators for value diffs, e.g. "ALL," or "types,venues;"
    #[arg(long)]
    pub kvseps: Option<String>,

    /// Prefix for every output line
    #[arg(long)]
    pub prefix: Option<String>,

    /// Extra directory searched for #include references (repeatable)
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    pub include_paths: Vec<PathBuf>,

    /// Glob of #include references to skip (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Seed for generated group labels (stable output)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Root config file
    pub file: PathBuf,

    /// Emit JSON rows instead of the aligned text form
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub resolve: ResolveFlags,
}

#[derive(Debug, Parser)]
pub struct DiffArgs {
    /// Baseline config file
    pub old: PathBuf,

    /// Updated config file
    pub new: PathBuf,

    /// Only report what OLD has that NEW lacks or changes (skip the reverse pass)
    #[arg(long)]
    pub one_way: bool,

    /// Exit with status 1 when differences are found
    #[arg(long)]
    pub exit_code: bool,

    #[command(flatten)]
    pub resolve: ResolveFlags,
}

#[derive(Debug, Parser)]
pub struct GroupsArgs {
    /// Root config file
    pub file: PathBuf,

    #[command(flatten)]
    pub resolve: ResolveFlags,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
