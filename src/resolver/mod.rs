//! Package version resolution, fetching and the lockfile.

pub mod lockfile;
pub mod packages;
pub mod version;

pub use packages::{merge, FetchStrategy, Fetcher, Package};
