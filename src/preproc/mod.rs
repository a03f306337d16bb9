//! Document preprocessing primitives.
//!
//! The YAML tree is the source of truth through the whole preprocessing
//! pipeline; typed decoding happens only after includes and templates have
//! been merged and attributes trimmed.

pub mod merge;
pub mod node;
pub mod params;

pub use merge::{clone_stripped, merge, trim_attributes, wrap_configs, wrap_visibility};
pub use node::{key_attribute, Node, Scalar};
pub use params::{substitute, substitute_node};
