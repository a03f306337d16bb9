//! Lockfile codec.
//!
//! Line-based, tab-separated: a `format\t<N>` header followed by one record
//! per package (`<s|c>\t<path>\t<url>\t<version>\t<original_version>`).
//! Records are written sorted by path so a stable resolved set produces a
//! byte-identical file. Reads tolerate any whitespace separation.

use std::path::PathBuf;

use crate::resolver::packages::{FetchStrategy, Package};

/// Version of the lockfile format.
pub const LOCKFILE_FORMAT: i64 = 1;

/// Parse a lockfile. A different format version yields the empty list.
pub fn read(input: &str) -> Vec<Package> {
    let mut tokens = input.split_whitespace();

    let _label = tokens.next();
    let format: i64 = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);
    if format != LOCKFILE_FORMAT {
        tracing::warn!("unsupported resolved format: {format}");
        return Vec::new();
    }

    let mut packages = Vec::new();
    loop {
        let Some(strategy) = tokens.next().and_then(parse_strategy) else {
            break;
        };
        let (Some(path), Some(url), Some(version), Some(original_version)) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            break;
        };

        packages.push(Package {
            strategy,
            path: PathBuf::from(path),
            url: url.to_string(),
            version: version.to_string(),
            original_version: original_version.to_string(),
        });
    }

    packages
}

/// Serialize packages sorted ascending by path.
pub fn write(packages: &[Package]) -> String {
    let mut sorted_packages = packages.to_vec();
    sorted_packages.sort_by(|pkg1, pkg2| pkg1.path.cmp(&pkg2.path));

    let mut out = format!("format\t{LOCKFILE_FORMAT}\n");
    for pkg in &sorted_packages {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            strategy_char(pkg.strategy),
            pkg.path.display(),
            pkg.url,
            pkg.version,
            pkg.original_version,
        ));
    }

    out
}

fn strategy_char(strategy: FetchStrategy) -> char {
    match strategy {
        FetchStrategy::Submodule => 's',
        FetchStrategy::Clone => 'c',
    }
}

fn parse_strategy(token: &str) -> Option<FetchStrategy> {
    match token {
        "s" => Some(FetchStrategy::Submodule),
        "c" => Some(FetchStrategy::Clone),
        _ => None,
    }
}
