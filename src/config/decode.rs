//! Tree-to-model decoding.
//!
//! Decoding is lenient by design: the schema validator has already reported
//! every real problem, so a missing or mistyped node simply decodes to its
//! default. Section lookups use exact keys; keys still carrying a `:REPLACE`
//! attribute are invisible here (attributes are trimmed before the final
//! decode).

use indexmap::IndexMap;

use crate::config::model::{
    Config, ConfigsDefinitions, ConfigsExpressions, ConfigsExpressionsMap, Definition,
    ExecutableTarget, Expression, ExternalPackage, FetchStrategy, Include, LibraryTarget,
    LibraryType, OptionDecl, Package, PackageSpec, Project, SystemPackage, Target,
    TargetKind, TargetSettings, Template, VisibilityDefinitions, VisibilityExpressions,
};
use crate::preproc::node::Node;

/// Decode a fully preprocessed tree.
pub fn decode(root: &Node) -> Config {
    Config {
        version: scalar_value(root.get("version")),
        project: decode_project(root.get("project")),
        includes: decode_includes(root.get("includes")),
        templates: decode_templates(root.get("templates")),
        options: decode_options(root.get("options")),
        settings: decode_expression_map(root.get("settings")),
        packages: decode_packages(root.get("packages")),
        targets: decode_targets(root.get("targets")),
    }
}

fn scalar_value(node: Option<&Node>) -> String {
    node.and_then(Node::as_scalar)
        .map(|s| s.value.clone())
        .unwrap_or_default()
}

fn decode_bool(node: Option<&Node>, fallback: bool) -> bool {
    let value = scalar_value(node);
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => true,
        "false" | "no" | "off" => false,
        _ => fallback,
    }
}

fn decode_expression(node: Option<&Node>) -> Expression {
    match node {
        None => Expression::default(),
        Some(node) => Expression {
            is_defined: true,
            is_quoted: node.as_scalar().map(|s| s.quoted).unwrap_or(false),
            value: scalar_value(Some(node)),
        },
    }
}

fn decode_string_list(node: Option<&Node>) -> Vec<String> {
    node.and_then(Node::as_sequence)
        .map(|items| items.iter().map(|item| scalar_value(Some(item))).collect())
        .unwrap_or_default()
}

fn decode_string_map(node: Option<&Node>) -> IndexMap<String, String> {
    node.and_then(Node::as_mapping)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.clone(), scalar_value(Some(value))))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_expression_list(node: Option<&Node>) -> Vec<Expression> {
    node.and_then(Node::as_sequence)
        .map(|items| items.iter().map(|item| decode_expression(Some(item))).collect())
        .unwrap_or_default()
}

fn decode_expression_map(node: Option<&Node>) -> IndexMap<String, Expression> {
    node.and_then(Node::as_mapping)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decode_expression(Some(value))))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_project(node: Option<&Node>) -> Project {
    match node {
        Some(Node::Scalar(s)) => Project {
            name: s.value.clone(),
            version: String::new(),
        },
        Some(node) => Project {
            name: scalar_value(node.get("name")),
            version: scalar_value(node.get("version")),
        },
        None => Project::default(),
    }
}

pub(crate) fn decode_includes(node: Option<&Node>) -> Vec<Include> {
    let Some(items) = node.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match item {
            Node::Scalar(s) => Include {
                paths: vec![s.value.clone()],
                parameters: IndexMap::new(),
            },
            other => Include {
                paths: decode_string_list(other.get("paths")),
                parameters: decode_string_map(other.get("parameters")),
            },
        })
        .collect()
}

fn decode_options(node: Option<&Node>) -> IndexMap<String, OptionDecl> {
    node.and_then(Node::as_mapping)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decode_option(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_option(node: &Node) -> OptionDecl {
    OptionDecl {
        description: scalar_value(node.get("description")),
        default: decode_expression(node.get("default")),
    }
}

fn decode_templates(node: Option<&Node>) -> IndexMap<String, TargetSettings> {
    node.and_then(Node::as_mapping)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decode_target_settings(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_packages(node: Option<&Node>) -> Vec<Package> {
    let Some(items) = node.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    items.iter().filter_map(decode_package).collect()
}

fn decode_package(node: &Node) -> Option<Package> {
    let if_ = scalar_value(node.get("if"));

    if let Some(name) = node.get("external") {
        return Some(Package {
            name: scalar_value(Some(name)),
            if_,
            spec: PackageSpec::External(ExternalPackage {
                url: scalar_value(node.get("url")),
                version: scalar_value(node.get("version")),
                strategy: decode_strategy(node.get("strategy")),
                options: decode_expression_map(node.get("options")),
            }),
        });
    }

    if let Some(name) = node.get("system") {
        return Some(Package {
            name: scalar_value(Some(name)),
            if_,
            spec: PackageSpec::System(SystemPackage {
                version: scalar_value(node.get("version")),
                is_required: decode_bool(node.get("required"), true),
            }),
        });
    }

    None
}

fn decode_strategy(node: Option<&Node>) -> FetchStrategy {
    match scalar_value(node).as_str() {
        "clone" => FetchStrategy::Clone,
        _ => FetchStrategy::Submodule,
    }
}

fn decode_targets(node: Option<&Node>) -> Vec<Target> {
    let Some(items) = node.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    items.iter().filter_map(decode_target).collect()
}

fn decode_target(node: &Node) -> Option<Target> {
    let templates = decode_template_list(node.get("templates"));
    let if_ = scalar_value(node.get("if"));

    if let Some(name) = node.get("library") {
        return Some(Target {
            name: scalar_value(Some(name)),
            if_,
            templates,
            kind: TargetKind::Library(LibraryTarget {
                library_type: decode_library_type(node.get("type")),
                aliases: decode_string_list(node.get("aliases")),
                settings: decode_target_settings(node),
            }),
        });
    }

    if let Some(name) = node.get("executable") {
        return Some(Target {
            name: scalar_value(Some(name)),
            if_,
            templates,
            kind: TargetKind::Executable(ExecutableTarget {
                settings: decode_target_settings(node),
            }),
        });
    }

    None
}

pub(crate) fn decode_template_list(node: Option<&Node>) -> Vec<Template> {
    let Some(items) = node.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match item {
            Node::Scalar(s) => Template {
                names: vec![s.value.clone()],
                parameters: IndexMap::new(),
            },
            other => Template {
                names: decode_string_list(other.get("names")),
                parameters: decode_string_map(other.get("parameters")),
            },
        })
        .collect()
}

fn decode_library_type(node: Option<&Node>) -> LibraryType {
    match scalar_value(node).as_str() {
        "shared" => LibraryType::Shared,
        "interface" => LibraryType::Interface,
        "object" => LibraryType::Object,
        _ => LibraryType::Static,
    }
}

/// Decode the settings of a target or template node. The node must already
/// be in normal form (visibility and configs wrapped).
pub(crate) fn decode_target_settings(node: &Node) -> TargetSettings {
    // executables and templates carry no `type` key and resolve as static
    let library_type = decode_library_type(node.get("type"));

    let visibility_exprs = |key: &str| {
        let mut visibility = decode_visibility_expressions(node.get(key));
        visibility.resolve_default(library_type);
        visibility
    };

    let mut definitions = decode_visibility_definitions(node.get("definitions"));
    definitions.resolve_default(library_type);

    TargetSettings {
        path: decode_expression(node.get("path")),
        options: decode_options(node.get("options")),
        settings: decode_expression_map(node.get("settings")),
        sources: visibility_exprs("sources"),
        includes: visibility_exprs("includes"),
        pchs: visibility_exprs("pchs"),
        dependencies: visibility_exprs("dependencies"),
        definitions,
        properties: decode_configs_map(node.get("properties")),
        compile_options: visibility_exprs("compile_options"),
        link_options: visibility_exprs("link_options"),
    }
}

fn decode_visibility_expressions(node: Option<&Node>) -> VisibilityExpressions {
    VisibilityExpressions {
        default: decode_configs_expressions(node.and_then(|n| n.get("default"))),
        public: decode_configs_expressions(node.and_then(|n| n.get("public"))),
        private: decode_configs_expressions(node.and_then(|n| n.get("private"))),
        interface: decode_configs_expressions(node.and_then(|n| n.get("interface"))),
    }
}

fn decode_configs_expressions(node: Option<&Node>) -> ConfigsExpressions {
    ConfigsExpressions {
        is_defined: node.is_some(),
        global: decode_expression_list(node.and_then(|n| n.get("global"))),
        configurations: decode_configurations(node, decode_expression_list),
    }
}

fn decode_visibility_definitions(node: Option<&Node>) -> VisibilityDefinitions {
    VisibilityDefinitions {
        default: decode_configs_definitions(node.and_then(|n| n.get("default"))),
        public: decode_configs_definitions(node.and_then(|n| n.get("public"))),
        private: decode_configs_definitions(node.and_then(|n| n.get("private"))),
        interface: decode_configs_definitions(node.and_then(|n| n.get("interface"))),
    }
}

fn decode_configs_definitions(node: Option<&Node>) -> ConfigsDefinitions {
    ConfigsDefinitions {
        is_defined: node.is_some(),
        global: decode_definition_list(node.and_then(|n| n.get("global"))),
        configurations: decode_configurations(node, decode_definition_list),
    }
}

fn decode_configs_map(node: Option<&Node>) -> ConfigsExpressionsMap {
    ConfigsExpressionsMap {
        is_defined: node.is_some(),
        global: decode_expression_map(node.and_then(|n| n.get("global"))),
        configurations: decode_configurations(node, decode_expression_map),
    }
}

fn decode_configurations<T>(
    node: Option<&Node>,
    decode_items: impl Fn(Option<&Node>) -> T,
) -> IndexMap<String, T> {
    node.and_then(|n| n.get("configurations"))
        .and_then(Node::as_mapping)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decode_items(Some(value))))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_definition_list(node: Option<&Node>) -> Vec<Definition> {
    let Some(items) = node.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Node::Scalar(_) => Some(Definition::Token(decode_expression(Some(item)))),
            Node::Mapping(_) => Some(Definition::Map(decode_expression_map(Some(item)))),
            _ => None,
        })
        .collect()
}
