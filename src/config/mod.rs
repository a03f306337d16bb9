//! Configuration model, validation and reading.

pub mod decode;
pub mod model;
pub mod read;
pub mod schema;

pub use model::{
    Config, Configs, Definition, ExecutableTarget, Expression, ExternalPackage, FetchStrategy,
    Include, LibraryTarget, LibraryType, OptionDecl, Package, PackageSpec, Project, SystemPackage,
    Target, TargetKind, TargetSettings, Template, Visibility,
};
pub use read::{read, CONFIG_VERSION};
