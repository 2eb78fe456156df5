//! Shared test utilities for integration tests
//!
//! Provides fixture creation and resolution helpers used across
//! multiple test files.

#![allow(dead_code)]

use assert_fs::prelude::*;
use groupconf::core::naming::NamingPolicy;
use groupconf::{FsPathFinder, Loader, Resolution, ResolveError, ResolveOptions};

/// Write each `(relative path, contents)` pair into a fresh temp dir.
pub fn make_fixture(files: &[(&str, &str)]) -> assert_fs::TempDir
{
    // Initialize the temporary project root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    for (path, body) in files
    {
        tmp.child(path)
            .write_str(body)
            .expect("write fixture");
    }

    // Return the prepared directory to the caller
    tmp
}

/// Options with a fixed label seed so generated names are stable
pub fn seeded_options() -> ResolveOptions
{
    ResolveOptions { seed: Some(7), naming: NamingPolicy::default(), ..ResolveOptions::default() }
}

/// Resolve `name` inside `dir` the way the CLI does (root dir searched first)
pub fn try_resolve(
    dir: &assert_fs::TempDir,
    name: &str,
) -> Result<Resolution, ResolveError>
{
    let root = dir
        .path()
        .join(name);
    let finder = FsPathFinder::for_root(&root, &[], &[]).expect("finder");

    Loader::new(&finder, seeded_options()).load(&root.to_string_lossy())
}

pub fn resolve(
    dir: &assert_fs::TempDir,
    name: &str,
) -> Resolution
{
    try_resolve(dir, name).expect("resolve")
}
