//! Filesystem utilities.
//!
//! Every mutating helper takes the working directory as an explicit root and
//! refuses to touch anything outside of it. Violations are programming
//! errors, not user errors, and terminate the process.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read access to configuration files, mockable for tests.
pub trait Files {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem, with relative paths resolved against a root.
pub struct DirFiles {
    root: PathBuf,
}

impl DirFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirFiles { root: root.into() }
    }
}

impl Files for DirFiles {
    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.root.join(path))
    }
}

/// Lexically normalize a path: resolve `.` and `..` components in place.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Check that `path` (absolute, or relative to `base`) stays under `base`.
pub fn is_sub(path: &Path, base: &Path) -> bool {
    let base = normalize(base);
    let full = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    };

    full.starts_with(&base)
}

/// Compare two paths after lexical normalization.
pub fn is_equal(path1: &Path, path2: &Path) -> bool {
    normalize(path1) == normalize(path2)
}

/// A path is empty when it doesn't exist, is an empty file, or an empty dir.
pub fn is_empty(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }

    if path.is_dir() {
        match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    } else {
        fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
    }
}

/// Remove a file or a directory tree, if it exists. `path` is relative to
/// `root` and must stay under it.
pub fn remove_all(root: &Path, path: &Path) {
    assert!(
        is_sub(path, root),
        "removing paths outside of the working dir is prohibited: {}",
        path.display()
    );

    let full = root.join(path);
    if !full.exists() {
        return;
    }

    tracing::debug!("remove everything at path: {}", full.display());
    let result = if full.is_dir() {
        fs::remove_dir_all(&full)
    } else {
        fs::remove_file(&full)
    };

    if let Err(err) = result {
        tracing::warn!("failed to remove {}: {}", full.display(), err);
    }
}

/// Rename `from` to `to`, if `from` exists. Both are relative to `root` and
/// must stay under it.
pub fn rename(root: &Path, from: &Path, to: &Path) {
    assert!(
        is_sub(from, root) && is_sub(to, root),
        "renaming paths outside of the working dir is prohibited: {} -> {}",
        from.display(),
        to.display()
    );

    let full_from = root.join(from);
    let full_to = root.join(to);
    if !full_from.exists() {
        return;
    }

    tracing::debug!(
        "rename path: {} -> {}",
        full_from.display(),
        full_to.display()
    );
    if let Err(err) = fs::rename(&full_from, &full_to) {
        tracing::warn!("failed to rename {}: {}", full_from.display(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_subpath_is_valid() {
        assert!(is_sub(Path::new("subdir"), Path::new("/path/to/dir")));
        assert!(is_sub(Path::new("../dir/subdir"), Path::new("/path/to/dir")));
        assert!(is_sub(Path::new("./subdir"), Path::new("/path/to/dir")));
    }

    #[test]
    fn test_absolute_subpath_is_valid() {
        assert!(is_sub(
            Path::new("/path/to/dir/subdir"),
            Path::new("/path/to/dir")
        ));
        assert!(is_sub(
            Path::new("/path/to/dir/../dir/subdir"),
            Path::new("/path/to/dir")
        ));
    }

    #[test]
    fn test_relative_path_from_other_hierarchy_is_invalid() {
        assert!(!is_sub(Path::new("../subdir"), Path::new("/path/to/dir")));
    }

    #[test]
    fn test_absolute_path_from_other_hierarchy_is_invalid() {
        assert!(!is_sub(Path::new("/path/to/subdir"), Path::new("/path/to/dir")));
    }

    #[test]
    fn test_path_equality() {
        assert!(is_equal(Path::new("pkg"), Path::new("./pkg")));
        assert!(is_equal(Path::new("a/../pkg"), Path::new("pkg")));
        assert!(!is_equal(Path::new("pkg1"), Path::new("pkg2")));
    }

    #[test]
    fn test_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();

        assert!(is_empty(&tmp.path().join("missing")));
        assert!(is_empty(tmp.path()));

        std::fs::write(tmp.path().join("file"), "content").unwrap();
        assert!(!is_empty(tmp.path()));
        assert!(!is_empty(&tmp.path().join("file")));
    }

    #[test]
    fn test_remove_and_rename_stay_under_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("pkg")).unwrap();
        std::fs::write(tmp.path().join("pkg/file"), "x").unwrap();

        rename(tmp.path(), Path::new("pkg"), Path::new("pkg.bak"));
        assert!(!tmp.path().join("pkg").exists());
        assert!(tmp.path().join("pkg.bak/file").exists());

        remove_all(tmp.path(), Path::new("pkg.bak"));
        assert!(!tmp.path().join("pkg.bak").exists());
    }

    #[test]
    #[should_panic]
    fn test_remove_outside_root_panics() {
        remove_all(Path::new("/path/to/dir"), Path::new("../escape"));
    }
}
