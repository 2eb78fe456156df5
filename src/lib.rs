//! **groupconf** - Resolver and semantic differ for group-based configuration files
//!
//! Config lines assign `key=value` settings to named groups of symbols inside
//! (possibly compound) sections. Files include each other, later settings
//! override earlier ones, and results are printed with readable group labels.

/// Command-line interface with clap integration
pub mod cli;

/// Command handlers for the resolving subcommands
pub mod cli_ext {
    /// Settings, loading and warning summary shared by the handlers
    pub mod session;

    /// Effective settings of one config tree
    pub mod show_cmd;
    pub use show_cmd::run as show_run;

    /// Two-way semantic diff
    pub mod diff_cmd;
    pub use diff_cmd::run as diff_run;

    /// Group listing
    pub mod groups_cmd;
    pub use groups_cmd::run as groups_run;

    /// Shell completion scripts
    pub mod completions_cmd;
    pub use completions_cmd::run as completions_run;
}

/// Core model - grammar, group algebra, override store, naming and diff
pub mod core {
    /// Fatal errors, warnings and source locations
    pub mod error;
    pub use error::{AlgebraError, ErrorKind, Location, ResolveError, Warning};

    /// Line classification and comment stripping
    pub mod line;

    /// Named symbol sets and the `A^B` conjunction algebra
    pub mod groups;
    pub use groups::{GroupTable, Groups, Set};

    /// Override-aware assignment store with full history
    pub mod store;
    pub use store::{SectionKey, Store};

    /// Compound section index for fallback lookups
    pub mod hierarchy;
    pub use hierarchy::SectionIndex;

    /// Post-load pairwise and prefix group combination
    pub mod combine;

    /// Readable labels for arbitrary symbol sets
    pub mod naming;
    pub use naming::NamingPolicy;

    /// Recursive include resolution
    pub mod resolver;
    pub use resolver::{Loader, Resolution, ResolveOptions};

    /// Semantic comparison and list-value deltas
    pub mod diff;
    pub use diff::{KvSeps, val_sep_diff};

    /// Text, JSON and group-listing output
    pub mod render;
}

/// Infrastructure - Configuration, path lookup and utilities
pub mod infra {
    /// Layered settings (file, GROUPCONF_* env, bare env overrides)
    pub mod config;
    pub use self::config::{Settings, init as config_init, load_settings};

    /// Include reference lookup with ignore globs
    pub mod paths;
    pub use paths::{FsPathFinder, PathService};

    /// Text helpers
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use cli_ext::{completions_run, diff_run, groups_run, show_run};
pub use infra::{FsPathFinder, PathService, Settings, load_settings};

// Core types for external consumers
pub use crate::core::{KvSeps, Loader, Resolution, ResolveError, ResolveOptions, Warning};
