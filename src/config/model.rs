//! Typed configuration model.
//!
//! The decoded, canonical form of a project description: shorthand is gone,
//! every per-target bag of items is lifted into `Configs` (global items plus
//! per-build-configuration items), and every visibility-bearing field into
//! `Visibility`.

use indexmap::IndexMap;

/// A textual value. `defined` distinguishes an absent node from an empty
/// one; `quoted` reproduces the author's quoting in the generated output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    pub is_defined: bool,
    pub is_quoted: bool,
    pub value: String,
}

impl Expression {
    pub fn new(is_defined: bool, is_quoted: bool, value: impl Into<String>) -> Self {
        Expression {
            is_defined,
            is_quoted,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Include {
    pub paths: Vec<String>,
    pub parameters: IndexMap<String, String>,
}

/// A cache option exposed by the project or by a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionDecl {
    pub description: String,
    pub default: Expression,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStrategy {
    #[default]
    Submodule,
    Clone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalPackage {
    pub url: String,
    pub version: String,
    pub strategy: FetchStrategy,
    pub options: IndexMap<String, Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPackage {
    pub version: String,
    pub is_required: bool,
}

impl Default for SystemPackage {
    fn default() -> Self {
        SystemPackage {
            version: String::new(),
            is_required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSpec {
    External(ExternalPackage),
    System(SystemPackage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub if_: String,
    pub spec: PackageSpec,
}

/// A template directive attached to a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pub names: Vec<String>,
    pub parameters: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibraryType {
    #[default]
    Static,
    Shared,
    Interface,
    Object,
}

/// Item containers that can live inside `Configs`.
pub trait Items: Default {
    fn is_empty(&self) -> bool;

    fn extend_from(&mut self, other: Self);
}

impl Items for Vec<Expression> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }

    fn extend_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl Items for Vec<Definition> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }

    fn extend_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl Items for IndexMap<String, Expression> {
    fn is_empty(&self) -> bool {
        IndexMap::is_empty(self)
    }

    fn extend_from(&mut self, other: Self) {
        self.extend(other);
    }
}

/// A bag of items split into global ones and per-build-configuration ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configs<T> {
    pub is_defined: bool,
    pub global: T,
    pub configurations: IndexMap<String, T>,
}

impl<T: Items> Configs<T> {
    pub fn is_empty(&self) -> bool {
        !self.is_defined
            || (self.global.is_empty() && self.configurations.values().all(Items::is_empty))
    }

    /// Fold another bag into this one: `is_defined` ORs, globals append,
    /// configurations extend.
    pub fn move_merge(&mut self, other: Configs<T>) {
        self.is_defined |= other.is_defined;
        self.global.extend_from(other.global);
        self.configurations.extend(other.configurations);
    }
}

/// Per-visibility bags. After decoding, `default` has been resolved into
/// `interface` (interface libraries) or `private` (everything else) and is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility<T> {
    pub default: T,
    pub public: T,
    pub private: T,
    pub interface: T,
}

impl<T: Items> Visibility<Configs<T>> {
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty() && self.interface.is_empty()
    }

    /// Resolve `default` items according to the target kind.
    pub fn resolve_default(&mut self, library_type: LibraryType) {
        let default = std::mem::take(&mut self.default);
        match library_type {
            LibraryType::Interface => self.interface.move_merge(default),
            _ => self.private.move_merge(default),
        }
    }
}

/// A compile definition: either a bare token or defined macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Token(Expression),
    Map(IndexMap<String, Expression>),
}

pub type ConfigsExpressions = Configs<Vec<Expression>>;
pub type ConfigsExpressionsMap = Configs<IndexMap<String, Expression>>;
pub type ConfigsDefinitions = Configs<Vec<Definition>>;
pub type VisibilityExpressions = Visibility<ConfigsExpressions>;
pub type VisibilityDefinitions = Visibility<ConfigsDefinitions>;

/// Settings shared by library targets, executable targets and templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSettings {
    pub path: Expression,
    pub options: IndexMap<String, OptionDecl>,
    pub settings: IndexMap<String, Expression>,
    pub sources: VisibilityExpressions,
    pub includes: VisibilityExpressions,
    pub pchs: VisibilityExpressions,
    pub dependencies: VisibilityExpressions,
    pub definitions: VisibilityDefinitions,
    pub properties: ConfigsExpressionsMap,
    pub compile_options: VisibilityExpressions,
    pub link_options: VisibilityExpressions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryTarget {
    pub library_type: LibraryType,
    pub aliases: Vec<String>,
    pub settings: TargetSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableTarget {
    pub settings: TargetSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Library(LibraryTarget),
    Executable(ExecutableTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub if_: String,
    pub templates: Vec<Template>,
    pub kind: TargetKind,
}

impl Target {
    pub fn settings(&self) -> &TargetSettings {
        match &self.kind {
            TargetKind::Library(library) => &library.settings,
            TargetKind::Executable(executable) => &executable.settings,
        }
    }
}

/// The decoded root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub version: String,
    pub project: Project,
    pub includes: Vec<Include>,
    pub templates: IndexMap<String, TargetSettings>,
    pub options: IndexMap<String, OptionDecl>,
    pub settings: IndexMap<String, Expression>,
    pub packages: Vec<Package>,
    pub targets: Vec<Target>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_identity() {
        // undefined is not the same as defined-and-empty
        let undefined = Expression::default();
        let empty = Expression::new(true, false, "");
        assert_ne!(undefined, empty);
    }

    #[test]
    fn test_configs_emptiness() {
        let mut configs = ConfigsExpressions::default();
        assert!(configs.is_empty());

        // defined but with no items still counts as empty
        configs.is_defined = true;
        assert!(configs.is_empty());

        configs.global.push(Expression::new(true, false, "item"));
        assert!(!configs.is_empty());
    }

    #[test]
    fn test_move_merge_appends() {
        let mut dst = ConfigsExpressions {
            is_defined: true,
            global: vec![Expression::new(true, false, "a")],
            configurations: IndexMap::new(),
        };

        let mut src = ConfigsExpressions {
            is_defined: true,
            global: vec![Expression::new(true, false, "b")],
            configurations: IndexMap::new(),
        };
        src.configurations
            .insert("Debug".to_string(), vec![Expression::new(true, false, "c")]);

        dst.move_merge(src);
        assert_eq!(dst.global.len(), 2);
        assert_eq!(dst.configurations["Debug"].len(), 1);
    }

    #[test]
    fn test_resolve_default_to_private() {
        let mut visibility = VisibilityExpressions::default();
        visibility.default.is_defined = true;
        visibility
            .default
            .global
            .push(Expression::new(true, false, "src.c"));

        visibility.resolve_default(LibraryType::Static);
        assert!(visibility.default.is_empty());
        assert_eq!(visibility.private.global.len(), 1);
    }

    #[test]
    fn test_resolve_default_to_interface() {
        let mut visibility = VisibilityExpressions::default();
        visibility.default.is_defined = true;
        visibility
            .default
            .global
            .push(Expression::new(true, false, "src.c"));

        visibility.resolve_default(LibraryType::Interface);
        assert!(visibility.default.is_empty());
        assert_eq!(visibility.interface.global.len(), 1);
        assert!(visibility.private.global.is_empty());
    }
}
