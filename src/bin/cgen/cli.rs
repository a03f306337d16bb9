//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Declarative CMake list generator with pinned external packages
#[derive(Parser)]
#[command(name = "cgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Generate CMakeLists.txt and fetch external packages
    #[arg(short = 'g', overrides_with = "update")]
    pub generate: bool,

    /// Update external packages
    #[arg(short = 'u', overrides_with = "generate")]
    pub update: bool,

    /// Packages to update (all of them when empty)
    #[arg(value_name = "PATH")]
    pub packages: Vec<PathBuf>,

    /// Verbose output with source locations
    #[arg(short = 'v')]
    pub verbose: bool,
}
