//! Git adapter.
//!
//! Every operation shells out to the git client and reports an opaque exit
//! status; the resolver decides what a failure means. Submodule operations
//! act on the repository enclosing the working directory.

use std::path::{Path, PathBuf};

use crate::util::process::ProcessBuilder;

/// Check whether a string looks like a commit hash. In strict mode only a
/// full 40-character hash qualifies. Branches named by pure hex digits are
/// misclassified; name branches accordingly.
pub fn is_commit(text: &str, strict: bool) -> bool {
    if strict && text.len() != 40 {
        return false;
    }

    !text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// Git operations used by the package resolver. Implementations return raw
/// exit statuses; zero means success.
pub trait Git {
    fn remote_tags(&self, url: &str) -> Result<Vec<String>, i32>;

    fn resolve_ref(&self, repo: &Path, reference: &str) -> Result<String, i32>;

    fn reset_hard(&self, repo: &Path, reference: &str) -> i32;

    fn remove(&self, path: &Path) -> i32;

    fn clone_shallow(&self, path: &Path, url: &str) -> i32;

    fn clone_full(&self, path: &Path, url: &str) -> i32;

    fn clone_branch(&self, path: &Path, url: &str, branch: &str) -> i32;

    fn submodule_add(&self, path: &Path, url: &str) -> i32;

    fn submodule_init(&self, path: &Path) -> i32;

    fn submodule_deinit(&self, path: &Path) -> i32;
}

/// The real git client, invoked from the working directory.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GitCli { root: root.into() }
    }

    fn run(&self, args: &[&str]) -> (i32, String) {
        let builder = ProcessBuilder::new("git").args(args).cwd(&self.root);
        tracing::trace!("execute command: {}", builder.display_command());

        let output = match builder.exec() {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!("can't execute git: {err}");
                return (-1, String::new());
            }
        };

        let status = output.status.code().unwrap_or(-1);
        if status != 0 {
            tracing::warn!(
                "command failed: {}\n\texit status: {}",
                builder.display_command(),
                status
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string();

        (status, stdout)
    }
}

impl Git for GitCli {
    fn remote_tags(&self, url: &str) -> Result<Vec<String>, i32> {
        let (status, out) = self.run(&["ls-remote", "--tags", "--refs", url]);
        if status != 0 {
            return Err(status);
        }

        const PREFIX: &str = "refs/tags/";
        let tags = out
            .lines()
            .filter_map(|line| line.find(PREFIX).map(|pos| line[pos + PREFIX.len()..].to_string()))
            .collect();

        Ok(tags)
    }

    fn resolve_ref(&self, repo: &Path, reference: &str) -> Result<String, i32> {
        let repo = repo.to_string_lossy();
        let (status, out) = self.run(&["-C", &repo, "rev-parse", "--verify", reference]);
        if status != 0 {
            return Err(status);
        }

        if !is_commit(&out, true) {
            tracing::warn!("invalid commit hash: {out}");
            return Err(-1);
        }

        Ok(out)
    }

    fn reset_hard(&self, repo: &Path, reference: &str) -> i32 {
        let repo = repo.to_string_lossy();
        self.run(&["-C", &repo, "reset", "--hard", reference]).0
    }

    fn remove(&self, path: &Path) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["rm", "--force", "--ignore-unmatch", &path]).0
    }

    fn clone_shallow(&self, path: &Path, url: &str) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["clone", "--recursive", "--depth", "1", url, &path]).0
    }

    fn clone_full(&self, path: &Path, url: &str) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["clone", "--recursive", url, &path]).0
    }

    fn clone_branch(&self, path: &Path, url: &str, branch: &str) -> i32 {
        let path = path.to_string_lossy();
        self.run(&[
            "clone",
            "--recursive",
            "--depth",
            "1",
            "--branch",
            branch,
            url,
            &path,
        ])
        .0
    }

    fn submodule_add(&self, path: &Path, url: &str) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["submodule", "add", "--force", url, &path]).0
    }

    fn submodule_init(&self, path: &Path) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["-C", &path, "submodule", "update", "--init", "--recursive"])
            .0
    }

    fn submodule_deinit(&self, path: &Path) -> i32 {
        let path = path.to_string_lossy();
        self.run(&["submodule", "deinit", "--force", &path]).0
    }
}
