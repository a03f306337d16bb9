//! Run-error taxonomy.
//!
//! Errors are values: every stage appends to a shared `Vec<Error>` and the
//! whole list is printed once the run finishes. Infrastructure failures
//! (unreadable files, spawn errors) are reported through `anyhow` instead.

use std::path::PathBuf;

use thiserror::Error;

/// An error recorded during a generate or update run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unsupported config version: {version}")]
    ConfigUnsupportedVersion { version: String },

    /// Schema violation; `message` carries the slash-path and the details.
    #[error("config validation error: {message}")]
    ConfigValidationError { message: String },

    #[error("config include file not found: {path}")]
    ConfigIncludeNotFound { path: String },

    #[error("{path}: undefined config include parameter: {name}")]
    ConfigUndefinedIncludeParameter { path: String, name: String },

    #[error("{target}: config template not found: {name}")]
    ConfigTemplateNotFound { target: String, name: String },

    #[error("{template}: undefined config template parameter: {name}")]
    ConfigUndefinedTemplateParameter { template: String, name: String },

    #[error("package not found: {}", path.display())]
    PackageNotFound { path: PathBuf },

    #[error("{origin}: package version resolution error: {subject}")]
    PackageVersionResolutionError { origin: String, subject: String },

    #[error("{url}: package fetch error: {status}")]
    PackageFetchError { url: String, status: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        let err = Error::ConfigUnsupportedVersion {
            version: "2".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported config version: 2");

        let err = Error::ConfigUndefinedIncludeParameter {
            path: "lib/common".to_string(),
            name: "library".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "lib/common: undefined config include parameter: library"
        );

        let err = Error::PackageFetchError {
            url: "https://example.com/repo.git".to_string(),
            status: 128,
        };
        assert_eq!(
            err.to_string(),
            "https://example.com/repo.git: package fetch error: 128"
        );
    }
}
