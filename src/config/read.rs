//! Configuration reading pipeline.
//!
//! validate → merge includes → validate → merge templates → trim →
//! validate → decode. The tree stays the source of truth until the very
//! last step; shorthand is wrapped into normal form before every merge so
//! both sides of a merge always have the same shape.

use std::collections::HashSet;
use std::path::Path;

use crate::config::decode;
use crate::config::model::Config;
use crate::config::schema;
use crate::errors::Error;
use crate::preproc::node::Node;
use crate::preproc::{merge, substitute_node, trim_attributes, wrap_configs, wrap_visibility};
use crate::util::fs::Files;

/// Major version of the supported configuration format.
pub const CONFIG_VERSION: i64 = 1;

const SETTINGS_KEYS: [&str; 7] = [
    "sources",
    "includes",
    "pchs",
    "dependencies",
    "definitions",
    "compile_options",
    "link_options",
];

/// Read a configuration document. Include files are resolved through
/// `files`. Errors accumulate in `errors`; on any error the returned config
/// is empty.
pub fn read(input: &str, files: &dyn Files, errors: &mut Vec<Error>) -> Config {
    let mut root = match Node::parse(input) {
        Ok(root) => root,
        Err(err) => {
            tracing::debug!("config parse error: {err}");
            errors.push(Error::ConfigValidationError {
                message: err.to_string(),
            });
            return Config::default();
        }
    };

    tracing::trace!("check config version");
    if !check_version(&root, errors) {
        return Config::default();
    }

    tracing::trace!("validate config before merging includes");
    if !validate(&root, errors) {
        return Config::default();
    }

    tracing::trace!("merge includes");
    let mut included_paths = HashSet::new();
    merge_includes(&mut root, &mut included_paths, files, errors);

    tracing::trace!("validate config before merging templates");
    if !validate(&root, errors) {
        return Config::default();
    }

    tracing::trace!("merge templates");
    merge_templates(&mut root, errors);
    trim_attributes(&mut root);

    tracing::trace!("validate config after preprocessing");
    if !validate(&root, errors) {
        return Config::default();
    }

    if !errors.is_empty() {
        return Config::default();
    }

    // targets that sat under a `targets:REPLACE` key become visible only
    // after the trim, so their shorthand still needs wrapping
    normalize(&mut root);

    tracing::trace!("decode config");
    decode::decode(&root)
}

fn check_version(root: &Node, errors: &mut Vec<Error>) -> bool {
    let Some(scalar) = root.get("version").and_then(Node::as_scalar) else {
        return true;
    };

    let version: i64 = scalar.value.trim().parse().unwrap_or(0);
    if version == CONFIG_VERSION {
        return true;
    }

    tracing::debug!("unsupported config version: {version}");
    errors.push(Error::ConfigUnsupportedVersion {
        version: version.to_string(),
    });

    false
}

fn validate(root: &Node, errors: &mut Vec<Error>) -> bool {
    let validation_errors = schema::validate(root);
    if validation_errors.is_empty() {
        return true;
    }

    for err in validation_errors {
        tracing::debug!("config validation error: {}", err.description());
        errors.push(Error::ConfigValidationError {
            message: err.description(),
        });
    }

    false
}

/// Wrap every target and template settings node into normal form, so merges
/// always see `{default: {global: ...}}` shapes on both sides.
fn normalize(root: &mut Node) {
    if let Some(entries) = root
        .get_mut("templates")
        .and_then(Node::as_mapping_mut)
    {
        for (_, value) in entries.iter_mut() {
            normalize_settings(value);
        }
    }

    if let Some(items) = root.get_mut("targets").and_then(Node::as_sequence_mut) {
        for item in items.iter_mut() {
            normalize_settings(item);
        }
    }
}

fn normalize_settings(node: &mut Node) {
    wrap_configs(node, "properties");
    for key in SETTINGS_KEYS {
        wrap_visibility(node, key);
    }
}

fn merge_includes(
    root: &mut Node,
    included_paths: &mut HashSet<String>,
    files: &dyn Files,
    errors: &mut Vec<Error>,
) {
    normalize(root);

    let includes = decode::decode_includes(root.get("includes"));

    for include in &includes {
        for include_path in &include.paths {
            if !files.exists(Path::new(include_path)) {
                tracing::debug!("config include not found: {include_path}");
                errors.push(Error::ConfigIncludeNotFound {
                    path: include_path.clone(),
                });
                continue;
            }

            if !included_paths.insert(include_path.clone()) {
                // cycle guard, the second visit is silently skipped
                continue;
            }

            let text = match files.read(Path::new(include_path)) {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!("can't read config include: {include_path}: {err}");
                    errors.push(Error::ConfigIncludeNotFound {
                        path: include_path.clone(),
                    });
                    continue;
                }
            };

            let mut include_node = match Node::parse(&text) {
                Ok(node) => node,
                Err(err) => {
                    tracing::debug!("config include parse error: {include_path}: {err}");
                    errors.push(Error::ConfigValidationError {
                        message: format!("{include_path}: {err}"),
                    });
                    continue;
                }
            };

            let mut undefined_params = Vec::new();
            substitute_node(&mut include_node, &include.parameters, &mut undefined_params);

            // nested includes merge inside-out; parameters don't propagate
            merge_includes(&mut include_node, included_paths, files, errors);

            // the outer document's identity is authoritative
            include_node.remove("version");
            include_node.remove("project");
            include_node.remove("includes");

            merge(&include_node, root);

            for param in undefined_params {
                tracing::debug!("undefined config include parameter: {param}");
                errors.push(Error::ConfigUndefinedIncludeParameter {
                    path: include_path.clone(),
                    name: param,
                });
            }
        }
    }
}

fn merge_templates(root: &mut Node, errors: &mut Vec<Error>) {
    normalize(root);

    let templates: Vec<(String, Node)> = root
        .get("templates")
        .and_then(Node::as_mapping)
        .map(<[(String, Node)]>::to_vec)
        .unwrap_or_default();

    let Some(targets) = root.get_mut("targets").and_then(Node::as_sequence_mut) else {
        return;
    };

    for target in targets.iter_mut() {
        let target_name = target
            .get("library")
            .or_else(|| target.get("executable"))
            .and_then(Node::as_scalar)
            .map(|s| s.value.clone())
            .unwrap_or_default();

        let directives = decode::decode_template_list(target.get("templates"));

        for directive in &directives {
            for template_name in &directive.names {
                let Some((_, template_node)) =
                    templates.iter().find(|(name, _)| name == template_name)
                else {
                    tracing::debug!("config template not found: {template_name}");
                    errors.push(Error::ConfigTemplateNotFound {
                        target: target_name.clone(),
                        name: template_name.clone(),
                    });
                    continue;
                };

                let mut template_node = template_node.clone();

                let mut undefined_params = Vec::new();
                substitute_node(
                    &mut template_node,
                    &directive.parameters,
                    &mut undefined_params,
                );

                merge(&template_node, target);

                for param in undefined_params {
                    tracing::debug!("undefined config template parameter: {param}");
                    errors.push(Error::ConfigUndefinedTemplateParameter {
                        template: template_name.clone(),
                        name: param,
                    });
                }
            }
        }

        trim_attributes(target);
    }
}
