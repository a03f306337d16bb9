//! High-level operations.
//!
//! The generate and update commands share the same read path: load and
//! preprocess the configuration, extract the desired external packages, and
//! reconcile the lockfile against them.

pub mod generate;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::model::{Config, PackageSpec};
use crate::errors::Error;
use crate::resolver::{self, lockfile, Fetcher, Package};
use crate::util::fs::DirFiles;
use crate::vcs::git::Git;

pub use generate::generate;
pub use update::update;

/// Configuration file name, by convention.
pub const CONFIG_FILE: &str = "cgen.yml";
/// Dot-prefixed variant of the configuration file name.
pub const CONFIG_FILE_HIDDEN: &str = ".cgen.yml";
/// Lockfile with the resolved package pins.
pub const RESOLVED_FILE: &str = "cgen.resolved";
/// Generated CMake list file.
pub const CMAKE_FILE: &str = "CMakeLists.txt";

pub(crate) struct ProjectInput {
    pub config: Config,
    pub packages: Vec<Package>,
    pub resolved: Vec<Package>,
}

/// Read and preprocess the configuration, extract the desired external
/// packages and load the lockfile. Returns `None` when the configuration
/// has errors (already printed).
pub(crate) fn read_project<G: Git>(
    root: &Path,
    fetcher: &Fetcher<G>,
) -> Result<Option<ProjectInput>> {
    let Some(config_path) = find_config(root) else {
        bail!("can't access config file: {CONFIG_FILE}");
    };

    tracing::info!("read config file: {}", config_path.display());
    let text = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    let mut errors = Vec::new();
    let config = crate::config::read(&text, &DirFiles::new(root), &mut errors);
    if !errors.is_empty() {
        print_errors(&errors);
        return Ok(None);
    }

    let packages = external_packages(&config);

    let mut resolved = Vec::new();
    let resolved_path = root.join(RESOLVED_FILE);
    if resolved_path.exists() {
        tracing::info!("read resolved file: {RESOLVED_FILE}");
        let text = std::fs::read_to_string(&resolved_path)
            .with_context(|| format!("failed to read {}", resolved_path.display()))?;
        resolved = lockfile::read(&text);
        resolved = fetcher.cleanup(&packages, &resolved);
    }

    Ok(Some(ProjectInput {
        config,
        packages,
        resolved,
    }))
}

fn find_config(root: &Path) -> Option<PathBuf> {
    [CONFIG_FILE, CONFIG_FILE_HIDDEN]
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
}

fn external_packages(config: &Config) -> Vec<Package> {
    let mut packages = Vec::new();

    for pkg in &config.packages {
        let PackageSpec::External(external) = &pkg.spec else {
            continue;
        };

        packages.push(Package {
            strategy: external.strategy,
            path: PathBuf::from(&pkg.name),
            url: external.url.clone(),
            version: external.version.clone(),
            // equals the version until the package is resolved
            original_version: if external.version.is_empty() {
                "HEAD".to_string()
            } else {
                external.version.clone()
            },
        });
    }

    packages
}

pub(crate) fn write_resolved(
    root: &Path,
    old_resolved: &[Package],
    new_resolved: &[Package],
) -> Result<()> {
    if old_resolved.is_empty() && new_resolved.is_empty() {
        return Ok(());
    }

    tracing::info!("write resolved file: {RESOLVED_FILE}");
    let merged = resolver::merge(old_resolved, new_resolved);
    std::fs::write(root.join(RESOLVED_FILE), lockfile::write(&merged))
        .with_context(|| format!("failed to write {RESOLVED_FILE}"))
}

pub(crate) fn print_errors(errors: &[Error]) {
    for err in errors {
        tracing::error!("{err}");
    }
}
