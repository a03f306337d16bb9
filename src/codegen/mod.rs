//! Build-script generation.

pub mod cmake;

pub use cmake::{generate, CMAKE_VERSION};
