//! Implementation of `cgen -g`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::codegen;
use crate::ops::{print_errors, read_project, write_resolved, CMAKE_FILE};
use crate::resolver::Fetcher;
use crate::vcs::GitCli;

/// Generate `CMakeLists.txt`, fetching external packages that changed.
/// Returns false when any run error was recorded.
pub fn generate(root: &Path) -> Result<bool> {
    let git = GitCli::new(root);
    let fetcher = Fetcher::new(root, &git);

    let Some(input) = read_project(root, &fetcher)? else {
        return Ok(false);
    };

    let mut errors = Vec::new();
    let mut new_resolved = Vec::new();
    if !input.packages.is_empty() {
        tracing::info!("resolve packages");
        new_resolved = fetcher.resolve(&input.packages, &input.resolved, &mut errors);
    }

    write_resolved(root, &input.resolved, &new_resolved)?;

    tracing::info!("generate and write cmake file: {CMAKE_FILE}");
    let cmake = codegen::generate(&input.config);
    std::fs::write(root.join(CMAKE_FILE), cmake)
        .with_context(|| format!("failed to write {CMAKE_FILE}"))?;

    print_errors(&errors);
    Ok(errors.is_empty())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::ops::CONFIG_FILE;

    #[test]
    fn test_generate_writes_cmake() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "project: hello\ntargets:\n  - executable: hello\n    sources: [ main.c ]\n",
        )
        .unwrap();

        let ok = generate(tmp.path()).unwrap();
        assert!(ok);

        let cmake = std::fs::read_to_string(tmp.path().join(CMAKE_FILE)).unwrap();
        assert!(cmake.contains("project(hello)"));
        assert!(cmake.contains("add_executable(hello)"));
        assert!(cmake.contains("main.c"));

        // no packages, no lockfile
        assert!(!tmp.path().join(crate::ops::RESOLVED_FILE).exists());
    }

    #[test]
    fn test_generate_without_config_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(generate(tmp.path()).is_err());
    }

    #[test]
    fn test_generate_with_invalid_config_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "settings: {}\n").unwrap();

        let ok = generate(tmp.path()).unwrap();
        assert!(!ok);
        assert!(!tmp.path().join(CMAKE_FILE).exists());
    }

    #[test]
    fn test_generate_resolves_includes_from_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "project: hello\nincludes:\n  - common.yml\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("common.yml"),
            "targets:\n  - library: common\n",
        )
        .unwrap();

        let ok = generate(tmp.path()).unwrap();
        assert!(ok);

        let cmake = std::fs::read_to_string(tmp.path().join(CMAKE_FILE)).unwrap();
        assert!(cmake.contains("add_library(common STATIC)"));
    }
}
