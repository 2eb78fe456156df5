//! Fatal resolution errors and non-fatal authoring warnings.
//!
//! Errors abort the whole resolution and travel up the include chain as
//! `Result`s; warnings are collected on the `Resolution` and reported by the
//! caller without stopping processing.

use std::fmt;
use std::path::PathBuf;

/// Position of a line inside a config file (1-based line number)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self { file: file.into(), line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Coarse classification of fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed directive, token count or key=value pair
    Syntax,
    /// Include cycles and misplaced group-definition directives
    Structural,
    /// Files that cannot be read
    Resource,
}

/// Errors raised while evaluating a group expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("bad group conjunction '{0}': expected exactly two operands")]
    BadConjunction(String),

    #[error("invalid group in conjunction: neither '{left}' nor '{right}' is a known group")]
    UnknownOperands { left: String, right: String },
}

/// Fatal errors produced while loading a config file tree
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("circular include of {}", path.display())]
    CircularInclude { path: PathBuf },

    #[error("cannot read file {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected #include inside #groupdef '{group}' at {at}: {text}")]
    IncludeInGroupDef { at: Location, group: String, text: String },

    #[error("empty #include at {at}: {text}")]
    EmptyInclude { at: Location, text: String },

    #[error("unexpected #groupdef while '{open}' is still open at {at}: {text}")]
    NestedGroupDef { at: Location, open: String, text: String },

    #[error("#groupdef without a group name at {at}: {text}")]
    MissingGroupName { at: Location, text: String },

    #[error("#groupdef with more than one word at {at}: {text}")]
    MultiWordGroupName { at: Location, text: String },

    #[error("unexpected #endgroupdef at {at}: {text}")]
    UnmatchedEndGroupDef { at: Location, text: String },

    #[error("#groupdef '{group}' opened at {at} is never closed")]
    UnterminatedGroupDef { at: Location, group: String },

    #[error("#groupdef '{group}' with more than one element at {at}: {text}")]
    MultiTokenMember { at: Location, group: String, text: String },

    #[error("bad line with less than 3 parts at {at}: {text}")]
    TooFewParts { at: Location, text: String },

    #[error("bad key=value pair '{pair}' at {at}: {text}")]
    BadKeyValue { at: Location, pair: String, text: String },

    #[error("{source} at {at}")]
    Algebra {
        at: Location,
        #[source]
        source: AlgebraError,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Unreadable { .. } => ErrorKind::Resource,
            ResolveError::CircularInclude { .. }
            | ResolveError::IncludeInGroupDef { .. }
            | ResolveError::NestedGroupDef { .. }
            | ResolveError::UnmatchedEndGroupDef { .. }
            | ResolveError::UnterminatedGroupDef { .. } => ErrorKind::Structural,
            ResolveError::EmptyInclude { .. }
            | ResolveError::MissingGroupName { .. }
            | ResolveError::MultiWordGroupName { .. }
            | ResolveError::MultiTokenMember { .. }
            | ResolveError::TooFewParts { .. }
            | ResolveError::BadKeyValue { .. }
            | ResolveError::Algebra { .. } => ErrorKind::Syntax,
        }
    }
}

/// Likely authoring mistakes that do not stop resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    DuplicateMember { at: Location, group: String, symbol: String },
    DuplicateGroupContent { first: String, second: String },
    DeepInclude { path: PathBuf, depth: usize },
    UnusedCustomName { name: String },
    AmbiguousFallback { symbol: String, section: String, param: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateMember { at, group, symbol } => {
                write!(f, "#groupdef '{group}' with duplicate element '{symbol}' at {at}")
            }
            Warning::DuplicateGroupContent { first, second } => {
                write!(f, "groups defined with same content: '{first}' vs. '{second}'")
            }
            Warning::DeepInclude { path, depth } => {
                write!(f, "suspicious include depth {depth} at {}", path.display())
            }
            Warning::UnusedCustomName { name } => {
                write!(f, "custom group name '{name}' is registered but never used")
            }
            Warning::AmbiguousFallback { symbol, section, param } => write!(
                f,
                "symbol '{symbol}' found many times in fallback lookup for {section} {param}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_displays_file_and_line() {
        let at = Location::new("conf/main.gcf", 12);
        assert_eq!(at.to_string(), "conf/main.gcf:12");
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        let cyc = ResolveError::CircularInclude { path: "a.gcf".into() };
        assert_eq!(cyc.kind(), ErrorKind::Structural);

        let kv = ResolveError::BadKeyValue {
            at: Location::new("a.gcf", 3),
            pair: "=x".into(),
            text: "online G =x".into(),
        };
        assert_eq!(kv.kind(), ErrorKind::Syntax);
        assert!(kv.to_string().contains("a.gcf:3"));

        let io = ResolveError::Unreadable {
            path: "missing.gcf".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.kind(), ErrorKind::Resource);
    }
}
