//! Package resolution and fetching.
//!
//! The resolver diffs the desired package list against the lockfile and
//! fetches what changed. Fetching must leave the workspace consistent even
//! when a step fails halfway: the old work tree and its `.git/modules`
//! entry are renamed aside first and restored on any failure, so a package
//! is never observed half-fetched. Failures are isolated per package.

use std::path::{Path, PathBuf};

use crate::errors::Error;
use crate::resolver::version;
use crate::util::fs;
use crate::vcs::git::{is_commit, Git};

pub use crate::config::model::FetchStrategy;

const GIT_MODULES: &str = ".git/modules";
const BACKUP_SUFFIX: &str = ".bak";

/// A desired or resolved package. Before fetching, `version` is whatever
/// the user wrote; after fetching it is the resolved commit hash, while
/// `original_version` keeps the user-facing spec for drift detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub strategy: FetchStrategy,
    pub path: PathBuf,
    pub url: String,
    pub version: String,
    pub original_version: String,
}

/// Fetches packages into a working directory through a git client.
pub struct Fetcher<'a, G: Git> {
    root: PathBuf,
    git: &'a G,
}

impl<'a, G: Git> Fetcher<'a, G> {
    pub fn new(root: impl Into<PathBuf>, git: &'a G) -> Self {
        Fetcher {
            root: root.into(),
            git,
        }
    }

    /// Drop resolved packages that left the config, removing their trees.
    pub fn cleanup(&self, pkgs: &[Package], resolved_pkgs: &[Package]) -> Vec<Package> {
        let mut result = Vec::new();

        for resolved in resolved_pkgs {
            if contains(pkgs, &resolved.path) {
                result.push(resolved.clone());
            } else {
                self.remove(resolved);
            }
        }

        result
    }

    /// Resolve desired packages against the lockfile: fetch what changed,
    /// refetch what disappeared from disk, reuse the rest.
    pub fn resolve(
        &self,
        pkgs: &[Package],
        resolved_pkgs: &[Package],
        errors: &mut Vec<Error>,
    ) -> Vec<Package> {
        let mut result = Vec::new();

        for pkg in pkgs {
            let resolved = find(resolved_pkgs, &pkg.path);

            match resolved {
                Some(resolved)
                    if resolved.original_version == pkg.original_version
                        && resolved.strategy == pkg.strategy =>
                {
                    if fs::is_empty(&self.root.join(&pkg.path)) {
                        // resolved before, but missing on disk
                        tracing::debug!("fetch resolved package: {}", resolved.url);
                        if self.fetch(resolved, errors).is_some() {
                            result.push(resolved.clone());
                        }
                    } else {
                        tracing::debug!(
                            "package already resolved and exists: {}",
                            resolved.path.display()
                        );
                        result.push(resolved.clone());
                    }
                }
                _ => {
                    // not resolved yet, or the version or strategy drifted
                    tracing::debug!("fetch new package: {}", pkg.url);
                    if let Some(fetched) = self.fetch(pkg, errors) {
                        result.push(fetched);
                    }
                }
            }
        }

        result
    }

    /// Refetch the given packages, or all of them when `paths` is empty.
    pub fn update(
        &self,
        pkgs: &[Package],
        paths: &[PathBuf],
        errors: &mut Vec<Error>,
    ) -> Vec<Package> {
        let mut result = Vec::new();

        if paths.is_empty() {
            for pkg in pkgs {
                tracing::debug!("update package: {}", pkg.url);
                if let Some(fetched) = self.fetch(pkg, errors) {
                    result.push(fetched);
                }
            }

            return result;
        }

        for path in paths {
            match pkgs.iter().find(|pkg| fs::is_equal(path, &pkg.path)) {
                Some(pkg) => {
                    tracing::debug!("update package: {}", pkg.url);
                    if let Some(fetched) = self.fetch(pkg, errors) {
                        result.push(fetched);
                    }
                }
                None => {
                    tracing::debug!("package not found: {}", path.display());
                    errors.push(Error::PackageNotFound { path: path.clone() });
                }
            }
        }

        result
    }

    fn fetch(&self, pkg: &Package, errors: &mut Vec<Error>) -> Option<Package> {
        assert!(
            fs::is_sub(&pkg.path, &self.root),
            "fetching packages into paths outside of the working dir is prohibited: {}",
            pkg.path.display()
        );

        self.backup(pkg);

        let mut status;
        match pkg.strategy {
            FetchStrategy::Submodule => {
                if pkg.version.is_empty() {
                    tracing::trace!("add submodule: {}", pkg.url);
                    status = self.git.submodule_add(&pkg.path, &pkg.url);
                } else if version::is_valid(&pkg.version) {
                    let Some(tag) = self.find_tag(pkg, errors) else {
                        self.backup_restore(pkg);
                        return None;
                    };

                    tracing::trace!("add submodule: {}\n\ttag: {}", pkg.url, tag);
                    status = self.git.submodule_add(&pkg.path, &pkg.url);
                    status |= self.git.reset_hard(&pkg.path, &tag);
                } else {
                    // a branch name or a commit hash
                    tracing::trace!("add submodule: {}\n\tref: {}", pkg.url, pkg.version);
                    status = self.git.submodule_add(&pkg.path, &pkg.url);
                    status |= self.git.reset_hard(&pkg.path, &pkg.version);
                }

                // pull nested submodules
                status |= self.git.submodule_init(&pkg.path);
            }
            FetchStrategy::Clone => {
                if pkg.version.is_empty() {
                    tracing::trace!("shallow clone: {}", pkg.url);
                    status = self.git.clone_shallow(&pkg.path, &pkg.url);
                } else if is_commit(&pkg.version, true) {
                    tracing::trace!("full clone: {}\n\tcommit: {}", pkg.url, pkg.version);
                    status = self.git.clone_full(&pkg.path, &pkg.url);
                    status |= self.git.reset_hard(&pkg.path, &pkg.version);
                } else if version::is_valid(&pkg.version) {
                    let Some(tag) = self.find_tag(pkg, errors) else {
                        self.backup_restore(pkg);
                        return None;
                    };

                    tracing::trace!("clone branch: {}\n\ttag: {}", pkg.url, tag);
                    status = self.git.clone_branch(&pkg.path, &pkg.url, &tag);
                } else {
                    tracing::trace!("clone branch: {}\n\tbranch: {}", pkg.url, pkg.version);
                    status = self.git.clone_branch(&pkg.path, &pkg.url, &pkg.version);
                }
            }
        }

        if status != 0 {
            tracing::debug!("can't fetch package: {}\n\texit status: {}", pkg.url, status);
            errors.push(Error::PackageFetchError {
                url: pkg.url.clone(),
                status,
            });

            self.backup_restore(pkg);
            return None;
        }

        tracing::trace!("resolve commit hash of the current HEAD: {}", pkg.path.display());
        let commit = match self.git.resolve_ref(&pkg.path, "HEAD") {
            Ok(commit) => commit,
            Err(status) => {
                tracing::debug!(
                    "can't resolve commit hash of current HEAD: {}\n\texit status: {}",
                    pkg.path.display(),
                    status
                );
                errors.push(Error::PackageVersionResolutionError {
                    origin: pkg.path.display().to_string(),
                    subject: status.to_string(),
                });

                self.backup_restore(pkg);
                return None;
            }
        };

        // a full clone leaves a .git directory behind; a submodule's .git
        // *file* must be preserved
        if self.root.join(&pkg.path).join(".git").is_dir() {
            fs::remove_all(&self.root, &pkg.path.join(".git"));
        }

        let resolved = Package {
            strategy: pkg.strategy,
            path: pkg.path.clone(),
            url: pkg.url.clone(),
            version: commit,
            original_version: pkg.original_version.clone(),
        };

        tracing::debug!(
            "resolved package\n\tpath: {}\n\turl: {}\n\tcommit: {}",
            resolved.path.display(),
            resolved.url,
            resolved.version
        );

        self.backup_remove(pkg);
        Some(resolved)
    }

    fn find_tag(&self, pkg: &Package, errors: &mut Vec<Error>) -> Option<String> {
        tracing::trace!("get all remote tags: {}", pkg.url);
        let tags = match self.git.remote_tags(&pkg.url) {
            Ok(tags) => tags,
            Err(_) => {
                tracing::debug!("can't get remote tags: {}", pkg.url);
                errors.push(Error::PackageVersionResolutionError {
                    origin: pkg.url.clone(),
                    subject: pkg.version.clone(),
                });
                return None;
            }
        };

        tracing::trace!("find tag by version: {}", pkg.version);
        match version::find_tag(&pkg.version, &tags, false) {
            Some(tag) => Some(tag),
            None => {
                tracing::debug!(
                    "can't find tag by version: {}\n\turl: {}",
                    pkg.version,
                    pkg.url
                );
                errors.push(Error::PackageVersionResolutionError {
                    origin: pkg.url.clone(),
                    subject: pkg.version.clone(),
                });
                None
            }
        }
    }

    fn remove(&self, pkg: &Package) {
        if !self.root.join(&pkg.path).exists() {
            return;
        }

        self.git.submodule_deinit(&pkg.path);
        self.git.remove(&pkg.path);

        fs::remove_all(&self.root, &Path::new(GIT_MODULES).join(&pkg.path));
        fs::remove_all(&self.root, &pkg.path);
    }

    fn backup(&self, pkg: &Package) {
        let modules_path = Path::new(GIT_MODULES).join(&pkg.path);
        fs::rename(&self.root, &modules_path, &backup_path(&modules_path));
        fs::rename(&self.root, &pkg.path, &backup_path(&pkg.path));
        self.remove(pkg);
    }

    fn backup_remove(&self, pkg: &Package) {
        let modules_path = Path::new(GIT_MODULES).join(&pkg.path);
        fs::remove_all(&self.root, &backup_path(&modules_path));
        fs::remove_all(&self.root, &backup_path(&pkg.path));
    }

    fn backup_restore(&self, pkg: &Package) {
        self.remove(pkg);

        let modules_path = Path::new(GIT_MODULES).join(&pkg.path);
        fs::rename(&self.root, &backup_path(&modules_path), &modules_path);
        fs::rename(&self.root, &backup_path(&pkg.path), &pkg.path);
    }
}

/// Combine lockfile entries: `to` wins, `from` fills in missing paths.
pub fn merge(from: &[Package], to: &[Package]) -> Vec<Package> {
    let mut result = to.to_vec();

    for pkg in from {
        if !contains(&result, &pkg.path) {
            result.push(pkg.clone());
        }
    }

    result
}

fn find<'a>(pkgs: &'a [Package], path: &Path) -> Option<&'a Package> {
    pkgs.iter().find(|pkg| pkg.path == path)
}

fn contains(pkgs: &[Package], path: &Path) -> bool {
    find(pkgs, path).is_some()
}

fn backup_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{}", path.display(), BACKUP_SUFFIX))
}
