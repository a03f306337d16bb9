//! Implementation of `cgen -u`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::ops::{print_errors, read_project, write_resolved};
use crate::resolver::Fetcher;
use crate::vcs::GitCli;

/// Refetch the given packages (all of them when `paths` is empty) and
/// rewrite the lockfile. Returns false when any run error was recorded.
pub fn update(root: &Path, paths: &[PathBuf]) -> Result<bool> {
    let git = GitCli::new(root);
    let fetcher = Fetcher::new(root, &git);

    let Some(input) = read_project(root, &fetcher)? else {
        return Ok(false);
    };

    let mut errors = Vec::new();
    let mut new_resolved = Vec::new();
    if !input.packages.is_empty() {
        tracing::info!("update packages");
        new_resolved = fetcher.update(&input.packages, paths, &mut errors);
    } else {
        tracing::info!("nothing to update");
    }

    write_resolved(root, &input.resolved, &new_resolved)?;

    print_errors(&errors);
    Ok(errors.is_empty())
}
