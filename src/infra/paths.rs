//! Include reference lookup.
//! - Resolves `#include` references against a list of search directories
//! - Skips references matching configured ignore globs
//! - Canonicalizes hits so cycle detection compares stable identities
//!
//! Backed by `globset` for ignore patterns and `dunce` for canonical paths.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Maps include references to files
pub trait PathService
{
    /// Concrete path for `reference`; the reference itself when nothing
    /// better is found (reading it then reports the failure).
    fn locate(
        &self,
        reference: &str,
    ) -> PathBuf;

    /// True when `reference` should resolve to an empty configuration
    fn ignore(
        &self,
        reference: &str,
    ) -> bool;
}

/// Filesystem-backed path service with ordered search directories.
pub struct FsPathFinder
{
    /// Compiled set of ignored include references
    ignore_patterns: GlobSet,

    /// Directories tried in order for relative references
    search_dirs: Vec<PathBuf>,
}

impl FsPathFinder
{
    /// Build a finder with ignore patterns (e.g., "vendor/**", "*.local.gcf").
    /// Patterns match on the reference text as written.
    pub fn new(ignore_patterns: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in ignore_patterns
        {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self { ignore_patterns: builder.build()?, search_dirs: Vec::new() })
    }

    /// Finder for a root config file: its own directory is searched first,
    /// then `include_paths`.
    pub fn for_root(
        root: &Path,
        include_paths: &[PathBuf],
        ignore_patterns: &[String],
    ) -> Result<Self>
    {
        let mut finder = Self::new(ignore_patterns)?;

        if let Some(parent) = root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            finder = finder.with_search_dir(parent);
        }

        Ok(finder.with_search_dirs(include_paths.iter().cloned()))
    }

    /// (Optional) Append one search directory.
    pub fn with_search_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self
    {
        self.search_dirs
            .push(dir.into());
        self
    }

    /// (Optional) Append several search directories, keeping their order.
    pub fn with_search_dirs(
        mut self,
        dirs: impl IntoIterator<Item = PathBuf>,
    ) -> Self
    {
        self.search_dirs
            .extend(dirs);
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf]
    {
        &self.search_dirs
    }

    fn candidates(
        &self,
        reference: &str,
    ) -> Vec<PathBuf>
    {
        let direct = PathBuf::from(reference);

        if direct.is_absolute()
        {
            return vec![direct];
        }

        let mut out: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .map(|d| d.join(&direct))
            .collect();

        // Working-directory relative last
        out.push(direct);
        out
    }
}

impl PathService for FsPathFinder
{
    fn locate(
        &self,
        reference: &str,
    ) -> PathBuf
    {
        self.candidates(reference)
            .into_iter()
            .find(|p| p.is_file())
            .map(|p| dunce::canonicalize(&p).unwrap_or(p))
            .unwrap_or_else(|| PathBuf::from(reference))
    }

    fn ignore(
        &self,
        reference: &str,
    ) -> bool
    {
        self.ignore_patterns
            .is_match(reference)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::fs;

    #[test]
    fn root_directory_is_searched_first()
    {
        let tmp = tempfile::tempdir().unwrap();
        let conf = tmp
            .path()
            .join("conf");
        let shared = tmp
            .path()
            .join("shared");
        fs::create_dir_all(&conf).unwrap();
        fs::create_dir_all(&shared).unwrap();
        fs::write(conf.join("base.gcf"), "").unwrap();
        fs::write(shared.join("base.gcf"), "").unwrap();
        fs::write(shared.join("only.gcf"), "").unwrap();

        let finder =
            FsPathFinder::for_root(&conf.join("main.gcf"), &[shared.clone()], &[]).unwrap();

        assert_eq!(
            finder.locate("base.gcf"),
            dunce::canonicalize(conf.join("base.gcf")).unwrap()
        );
        assert_eq!(
            finder.locate("only.gcf"),
            dunce::canonicalize(shared.join("only.gcf")).unwrap()
        );
    }

    #[test]
    fn unknown_reference_is_returned_as_written()
    {
        let finder = FsPathFinder::new(&[]).unwrap();
        assert_eq!(finder.locate("does/not/exist.gcf"), PathBuf::from("does/not/exist.gcf"));
    }

    #[test]
    fn ignore_globs_match_reference_text()
    {
        let finder = FsPathFinder::new(&["vendor/**".to_string(), "*.local.gcf".to_string()]).unwrap();
        assert!(finder.ignore("vendor/x.gcf"));
        assert!(finder.ignore("site.local.gcf"));
        assert!(!finder.ignore("site.gcf"));
    }

    #[test]
    fn bad_glob_is_an_error()
    {
        assert!(FsPathFinder::new(&["a[".to_string()]).is_err());
    }
}
