//! Version-control client adapters.

pub mod git;

pub use git::{Git, GitCli};
