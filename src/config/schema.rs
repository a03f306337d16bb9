//! Embedded schema validation.
//!
//! The allowed document shapes are expressed directly as static data and
//! checked against the tree before each merge stage. Validation accepts both
//! the shorthand and the wrapped normal forms, ignores `:REPLACE` attributes
//! on keys, and accumulates every error instead of stopping at the first.

use crate::preproc::node::{key_attribute, Node};

/// A single validation error with a slash-path into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn description(&self) -> String {
        format!("{}: {}", self.path, self.message)
    }
}

enum Shape {
    /// Any scalar.
    Scalar,
    List(&'static Shape),
    Map(&'static Shape),
    /// Closed mapping: unknown keys are rejected. Fields are grouped so
    /// shapes can share the common target-settings group.
    Struct(&'static str, &'static [&'static [Field]]),
    /// Accepts the first matching alternative.
    Variant(&'static str, &'static [&'static Shape]),
}

struct Field {
    name: &'static str,
    required: bool,
    shape: &'static Shape,
}

const fn field(name: &'static str, required: bool, shape: &'static Shape) -> Field {
    Field {
        name,
        required,
        shape,
    }
}

static STRING: Shape = Shape::Scalar;
static STRING_LIST: Shape = Shape::List(&STRING);
static STRING_LIST_MAP: Shape = Shape::Map(&STRING_LIST);
static STRING_MAP: Shape = Shape::Map(&STRING);
static STRING_MAP_MAP: Shape = Shape::Map(&STRING_MAP);

static PROJECT: Shape = Shape::Variant("project", &[&STRING, &PROJECT_MAP]);
static PROJECT_FIELDS: [Field; 2] = [
    field("name", true, &STRING),
    field("version", false, &STRING),
];
static PROJECT_MAP: Shape = Shape::Struct("project", &[&PROJECT_FIELDS]);

static INCLUDE_LIST: Shape = Shape::List(&INCLUDE);
static INCLUDE: Shape = Shape::Variant("include", &[&STRING, &INCLUDE_MAP]);
static INCLUDE_FIELDS: [Field; 2] = [
    field("paths", true, &STRING_LIST),
    field("parameters", false, &STRING_MAP),
];
static INCLUDE_MAP: Shape = Shape::Struct("include", &[&INCLUDE_FIELDS]);

static OPTION_FIELDS: [Field; 2] = [
    field("description", true, &STRING),
    field("default", false, &STRING),
];
static OPTION: Shape = Shape::Struct("option", &[&OPTION_FIELDS]);
static OPTION_MAP: Shape = Shape::Map(&OPTION);

static PACKAGE_LIST: Shape = Shape::List(&PACKAGE);
static PACKAGE: Shape = Shape::Variant("package", &[&EXTERNAL_PACKAGE, &SYSTEM_PACKAGE]);
static EXTERNAL_PACKAGE_FIELDS: [Field; 6] = [
    field("external", true, &STRING),
    field("url", true, &STRING),
    field("if", false, &STRING),
    field("version", false, &STRING),
    field("strategy", false, &STRING),
    field("options", false, &STRING_MAP),
];
static EXTERNAL_PACKAGE: Shape = Shape::Struct("external_package", &[&EXTERNAL_PACKAGE_FIELDS]);
static SYSTEM_PACKAGE_FIELDS: [Field; 4] = [
    field("system", true, &STRING),
    field("if", false, &STRING),
    field("version", false, &STRING),
    field("required", false, &STRING),
];
static SYSTEM_PACKAGE: Shape = Shape::Struct("system_package", &[&SYSTEM_PACKAGE_FIELDS]);

// items with optional per-configuration and visibility lifting
static CONFIGS_EXPRS_FIELDS: [Field; 2] = [
    field("global", false, &STRING_LIST),
    field("configurations", false, &STRING_LIST_MAP),
];
static CONFIGS_EXPRS: Shape = Shape::Struct("configs", &[&CONFIGS_EXPRS_FIELDS]);
static CONFIGS_OR_LIST: Shape = Shape::Variant("configs", &[&STRING_LIST, &CONFIGS_EXPRS]);
static VISIBILITY_EXPRS_FIELDS: [Field; 4] = [
    field("default", false, &CONFIGS_OR_LIST),
    field("public", false, &CONFIGS_OR_LIST),
    field("private", false, &CONFIGS_OR_LIST),
    field("interface", false, &CONFIGS_OR_LIST),
];
static VISIBILITY_EXPRS: Shape = Shape::Struct("visibility", &[&VISIBILITY_EXPRS_FIELDS]);
static EXPRESSIONS: Shape =
    Shape::Variant("expressions", &[&STRING_LIST, &CONFIGS_EXPRS, &VISIBILITY_EXPRS]);

static DEFINITION: Shape = Shape::Variant("definition", &[&STRING, &STRING_MAP]);
static DEFINITION_LIST: Shape = Shape::List(&DEFINITION);
static DEFINITION_LIST_MAP: Shape = Shape::Map(&DEFINITION_LIST);
static CONFIGS_DEFS_FIELDS: [Field; 2] = [
    field("global", false, &DEFINITION_LIST),
    field("configurations", false, &DEFINITION_LIST_MAP),
];
static CONFIGS_DEFS: Shape = Shape::Struct("configs", &[&CONFIGS_DEFS_FIELDS]);
static CONFIGS_OR_DEF_LIST: Shape = Shape::Variant("configs", &[&DEFINITION_LIST, &CONFIGS_DEFS]);
static VISIBILITY_DEFS_FIELDS: [Field; 4] = [
    field("default", false, &CONFIGS_OR_DEF_LIST),
    field("public", false, &CONFIGS_OR_DEF_LIST),
    field("private", false, &CONFIGS_OR_DEF_LIST),
    field("interface", false, &CONFIGS_OR_DEF_LIST),
];
static VISIBILITY_DEFS: Shape = Shape::Struct("visibility", &[&VISIBILITY_DEFS_FIELDS]);
static DEFINITIONS: Shape =
    Shape::Variant("definitions", &[&DEFINITION_LIST, &CONFIGS_DEFS, &VISIBILITY_DEFS]);

static CONFIGS_PROPS_FIELDS: [Field; 2] = [
    field("global", false, &STRING_MAP),
    field("configurations", false, &STRING_MAP_MAP),
];
static CONFIGS_PROPS: Shape = Shape::Struct("configs", &[&CONFIGS_PROPS_FIELDS]);
static PROPERTIES: Shape = Shape::Variant("properties", &[&CONFIGS_PROPS, &STRING_MAP]);

static TEMPLATE_LIST: Shape = Shape::List(&TEMPLATE);
static TEMPLATE: Shape = Shape::Variant("template", &[&STRING, &TEMPLATE_MAP]);
static TEMPLATE_FIELDS: [Field; 2] = [
    field("names", true, &STRING_LIST),
    field("parameters", false, &STRING_MAP),
];
static TEMPLATE_MAP: Shape = Shape::Struct("template", &[&TEMPLATE_FIELDS]);

static SETTINGS_FIELDS: [Field; 11] = [
    field("path", false, &STRING),
    field("options", false, &OPTION_MAP),
    field("settings", false, &STRING_MAP),
    field("sources", false, &EXPRESSIONS),
    field("includes", false, &EXPRESSIONS),
    field("pchs", false, &EXPRESSIONS),
    field("dependencies", false, &EXPRESSIONS),
    field("definitions", false, &DEFINITIONS),
    field("properties", false, &PROPERTIES),
    field("compile_options", false, &EXPRESSIONS),
    field("link_options", false, &EXPRESSIONS),
];
static TARGET_SETTINGS: Shape = Shape::Struct("target_settings", &[&SETTINGS_FIELDS]);
static TARGET_SETTINGS_MAP: Shape = Shape::Map(&TARGET_SETTINGS);

static TARGET_LIST: Shape = Shape::List(&TARGET);
static TARGET: Shape = Shape::Variant("target", &[&LIBRARY_TARGET, &EXECUTABLE_TARGET]);
static LIBRARY_TARGET_FIELDS: [Field; 5] = [
    field("library", true, &STRING),
    field("type", false, &STRING),
    field("aliases", false, &STRING_LIST),
    field("if", false, &STRING),
    field("templates", false, &TEMPLATE_LIST),
];
static LIBRARY_TARGET: Shape =
    Shape::Struct("library_target", &[&LIBRARY_TARGET_FIELDS, &SETTINGS_FIELDS]);
static EXECUTABLE_TARGET_FIELDS: [Field; 3] = [
    field("executable", true, &STRING),
    field("if", false, &STRING),
    field("templates", false, &TEMPLATE_LIST),
];
static EXECUTABLE_TARGET: Shape = Shape::Struct(
    "executable_target",
    &[&EXECUTABLE_TARGET_FIELDS, &SETTINGS_FIELDS],
);

static CONFIG_FIELDS: [Field; 8] = [
    field("version", false, &STRING),
    field("project", true, &PROJECT),
    field("includes", false, &INCLUDE_LIST),
    field("templates", false, &TARGET_SETTINGS_MAP),
    field("options", false, &OPTION_MAP),
    field("settings", false, &STRING_MAP),
    field("packages", false, &PACKAGE_LIST),
    field("targets", false, &TARGET_LIST),
];
static CONFIG: Shape = Shape::Struct("config", &[&CONFIG_FIELDS]);

/// Validate the whole document. Returns every error found.
pub fn validate(root: &Node) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    check(root, &CONFIG, "", &mut errors);
    errors
}

fn child_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        format!("/{segment}")
    } else {
        format!("{path}.{segment}")
    }
}

fn check(node: &Node, shape: &Shape, path: &str, errors: &mut Vec<SchemaError>) {
    match shape {
        Shape::Scalar => match node {
            Node::Scalar(_) | Node::Null => {}
            _ => errors.push(SchemaError {
                path: path.to_string(),
                message: "expected value type: string".to_string(),
            }),
        },
        Shape::List(item_shape) => match node {
            Node::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    check(item, item_shape, &child_path(path, &i.to_string()), errors);
                }
            }
            Node::Null => {}
            _ => errors.push(SchemaError {
                path: path.to_string(),
                message: "expected value type: list".to_string(),
            }),
        },
        Shape::Map(value_shape) => match node {
            Node::Mapping(entries) => {
                for (key, value) in entries {
                    let base = key_attribute(key).0;
                    check(value, value_shape, &child_path(path, base), errors);
                }
            }
            Node::Null => {}
            _ => errors.push(SchemaError {
                path: path.to_string(),
                message: "expected value type: map".to_string(),
            }),
        },
        Shape::Struct(name, groups) => check_struct(node, name, groups, path, errors),
        Shape::Variant(name, variants) => {
            let mut failures: Vec<Vec<SchemaError>> = Vec::new();

            for variant in variants.iter() {
                let mut variant_errors = Vec::new();
                check(node, variant, path, &mut variant_errors);
                if variant_errors.is_empty() {
                    return;
                }
                failures.push(variant_errors);
            }

            let mut message = format!("expected value type: {name}");
            for (i, variant_errors) in failures.iter().enumerate() {
                message.push_str(&format!("\n\t* failed variant {i}:"));
                for err in variant_errors {
                    message.push_str(&format!("\n\t\t{}", err.description()));
                }
            }

            errors.push(SchemaError {
                path: path.to_string(),
                message,
            });
        }
    }
}

fn check_struct(
    node: &Node,
    name: &str,
    groups: &[&[Field]],
    path: &str,
    errors: &mut Vec<SchemaError>,
) {
    let fields = || groups.iter().flat_map(|group| group.iter());

    let Some(entries) = node.as_mapping() else {
        let required: Vec<&Field> = fields().filter(|f| f.required).collect();

        if node.is_null() || !required.is_empty() {
            for field in required {
                errors.push(SchemaError {
                    path: child_path(path, field.name),
                    message: "node not found".to_string(),
                });
            }
        } else {
            errors.push(SchemaError {
                path: path.to_string(),
                message: format!("expected value type: {name}"),
            });
        }

        return;
    };

    for field in fields().filter(|f| f.required) {
        let found = entries
            .iter()
            .any(|(key, _)| key_attribute(key).0 == field.name);
        if !found {
            errors.push(SchemaError {
                path: child_path(path, field.name),
                message: "node not found".to_string(),
            });
        }
    }

    for (key, value) in entries {
        let base = key_attribute(key).0;
        match fields().find(|f| f.name == base) {
            Some(field) => check(value, field.shape, &child_path(path, base), errors),
            None => errors.push(SchemaError {
                path: child_path(path, base),
                message: "undefined node".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_str(text: &str) -> Vec<SchemaError> {
        validate(&Node::parse(text).unwrap())
    }

    #[test]
    fn test_empty_config_misses_project() {
        let errors = validate_str("");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].description(), "/project: node not found");
    }

    #[test]
    fn test_minimal_config_is_valid() {
        assert!(validate_str("project: name").is_empty());
    }

    #[test]
    fn test_project_map_requires_name() {
        let errors = validate_str("project:\n  version: 1\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/project: expected value type: project\
             \n\t* failed variant 0:\
             \n\t\t/project: expected value type: string\
             \n\t* failed variant 1:\
             \n\t\t/project.name: node not found"
        );
    }

    #[test]
    fn test_include_requires_paths() {
        let errors = validate_str(
            r#"
            project: name
            includes:
              - parameters:
                  param1: value1
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/includes.0: expected value type: include\
             \n\t* failed variant 0:\
             \n\t\t/includes.0: expected value type: string\
             \n\t* failed variant 1:\
             \n\t\t/includes.0.paths: node not found"
        );
    }

    #[test]
    fn test_option_requires_description() {
        let errors = validate_str("project: name\noptions:\n  OPTION:\n    default: value\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/options.OPTION.description: node not found"
        );
    }

    #[test]
    fn test_template_must_be_target_settings() {
        let errors = validate_str("project: name\ntemplates:\n  template: invalid\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/templates.template: expected value type: target_settings"
        );
    }

    #[test]
    fn test_external_package_requires_url() {
        let errors = validate_str("project: name\npackages:\n  - external: package name\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/packages.0: expected value type: package\
             \n\t* failed variant 0:\
             \n\t\t/packages.0.url: node not found\
             \n\t* failed variant 1:\
             \n\t\t/packages.0.system: node not found\
             \n\t\t/packages.0.external: undefined node"
        );
    }

    #[test]
    fn test_target_requires_library_or_executable() {
        let errors = validate_str("project: name\ntargets:\n  - invalid\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].description(),
            "/targets.0: expected value type: target\
             \n\t* failed variant 0:\
             \n\t\t/targets.0.library: node not found\
             \n\t* failed variant 1:\
             \n\t\t/targets.0.executable: node not found"
        );
    }

    #[test]
    fn test_settings_accept_every_form() {
        let errors = validate_str(
            r#"
            project: name
            targets:
              - library: lib
                sources: [ a, b ]
              - library: lib2
                sources:
                  public:
                    configurations:
                      Release: [ c ]
                  private: [ d ]
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_wrapped_normal_form_is_accepted() {
        let errors = validate_str(
            r#"
            project: name
            targets:
              - library: lib
                sources:
                  default:
                    global: [ a ]
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_replace_attributes_are_ignored() {
        let errors = validate_str(
            r#"
            project: name
            targets:REPLACE:
              - library: lib
                sources:REPLACE: [ a ]
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let errors = validate_str(
            r#"
            project: name
            options:
              OPTION:
                default: value
            templates:
              template: invalid
            "#,
        );
        assert_eq!(errors.len(), 2);
    }
}
