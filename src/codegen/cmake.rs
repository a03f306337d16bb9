//! CMake list generation.
//!
//! A streaming pretty-printer over the decoded configuration: 4-space
//! indentation, coalesced blank lines, fixed section order. The output is a
//! pure function of the config, so equal configs produce byte-identical
//! scripts.

use indexmap::IndexMap;

use crate::config::model::{
    Config, ConfigsDefinitions, ConfigsExpressions, ConfigsExpressionsMap, Definition, Expression,
    LibraryType, OptionDecl, PackageSpec, Project, SystemPackage, TargetKind, TargetSettings,
    VisibilityDefinitions, VisibilityExpressions,
};

/// Minimum CMake version required by the generated lists.
pub const CMAKE_VERSION: &str = "3.11";

const INDENT: usize = 4;

/// Generate a CMake list for the configuration.
pub fn generate(config: &Config) -> String {
    let mut writer = CMakeWriter::new();
    writer.write(config);
    writer.out
}

struct CMakeWriter {
    out: String,
    indent: usize,
    last_is_blank: bool,
}

impl CMakeWriter {
    fn new() -> Self {
        CMakeWriter {
            out: String::new(),
            indent: 0,
            last_is_blank: false,
        }
    }

    fn write(&mut self, config: &Config) {
        tracing::trace!("begin codegen");

        self.comment(&format!(
            "Generated using cgen {}",
            env!("CARGO_PKG_VERSION")
        ));
        self.comment("DO NOT EDIT");
        self.blank();

        self.line(&format!("cmake_minimum_required(VERSION {CMAKE_VERSION})"));
        self.project(&config.project);

        if !config.options.is_empty() {
            tracing::trace!("write options");
            self.section("Options");
            for (name, option) in &config.options {
                self.option(name, option);
            }
        }

        let target_options = config_target_options(config);
        if !target_options.is_empty() {
            tracing::trace!("write target options");
            self.section("Target options");
            for (target_name, options) in target_options {
                self.blank();
                self.comment(&format!("options for target {target_name}"));
                for (name, option) in options {
                    self.option(name, option);
                }
            }
        }

        if !config.settings.is_empty() {
            tracing::trace!("write settings");
            self.section("Settings");
            for (name, expr) in &config.settings {
                self.set(name, expr, false);
            }
        }

        if has_system_packages(config) {
            tracing::trace!("write system packages");
            self.section("System packages");
            for package in &config.packages {
                let PackageSpec::System(system) = &package.spec else {
                    continue;
                };

                self.if_begin(&package.if_);
                self.find_package(&package.name, system);
                self.if_end(&package.if_);
            }
        }

        if has_external_packages(config) {
            tracing::trace!("write external packages");
            self.section("External packages");
            let mut package_idx = 0;
            for package in &config.packages {
                let PackageSpec::External(external) = &package.spec else {
                    continue;
                };

                self.blank();
                self.comment(&format!("package {}", package.name));
                let func_name = format!("cgen_package_{package_idx}");
                package_idx += 1;

                self.function_begin(&func_name);
                for (name, expr) in &external.options {
                    self.set(name, expr, true);
                }

                self.if_begin(&format!(
                    "EXISTS ${{PROJECT_SOURCE_DIR}}/{}/CMakeLists.txt",
                    package.name
                ));
                self.line(&format!("add_subdirectory({})", package.name));
                self.if_else();
                self.notice(&format!(
                    "Package {} doesn't have CMakeLists.txt",
                    package.name
                ));
                self.endif();
                self.function_end();

                self.if_begin(&package.if_);
                self.function_call(&func_name);
                self.if_end(&package.if_);
            }
        }

        if !config.targets.is_empty() {
            tracing::trace!("write targets");
            self.section("Targets");
            for (target_idx, target) in config.targets.iter().enumerate() {
                self.blank();
                self.comment(&format!("target {}", target.name));
                let func_name = format!("cgen_target_{target_idx}");

                self.function_begin(&func_name);
                match &target.kind {
                    TargetKind::Library(library) => {
                        for (name, expr) in &library.settings.settings {
                            self.set(name, expr, false);
                        }

                        self.add_library(&target.name, library.library_type);

                        for alias in &library.aliases {
                            self.add_library_alias(&target.name, alias);
                        }

                        self.target_settings(&target.name, &library.settings);
                    }
                    TargetKind::Executable(executable) => {
                        for (name, expr) in &executable.settings.settings {
                            self.set(name, expr, false);
                        }

                        self.add_executable(&target.name);
                        self.target_settings(&target.name, &executable.settings);
                    }
                }
                self.function_end();

                self.if_begin(&target.if_);
                self.function_call(&func_name);
                self.if_end(&target.if_);
            }
        }

        tracing::trace!("end codegen");
    }

    // low-level printing

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn unindent(&mut self) {
        debug_assert!(self.indent > 0, "negative indentation");
        self.indent -= 1;
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent * INDENT {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
        self.last_is_blank = false;
    }

    fn blank(&mut self) {
        if self.last_is_blank {
            return;
        }

        self.out.push('\n');
        self.last_is_blank = true;
    }

    fn comment(&mut self, text: &str) {
        if text.is_empty() {
            self.line("#");
        } else {
            self.line(&format!("# {text}"));
        }
    }

    fn section(&mut self, title: &str) {
        self.blank();
        self.comment("");
        self.comment(title);
        self.comment("");
        self.blank();
    }

    fn notice(&mut self, message: &str) {
        self.line(&format!("message(NOTICE {})", quote(message)));
    }

    fn if_begin(&mut self, condition: &str) {
        if condition.is_empty() {
            return;
        }

        self.line(&format!("if({condition})"));
        self.indent();
    }

    fn if_else(&mut self) {
        self.unindent();
        self.line("else()");
        self.indent();
    }

    fn if_end(&mut self, condition: &str) {
        if condition.is_empty() {
            return;
        }

        self.endif();
    }

    fn endif(&mut self) {
        self.unindent();
        self.line("endif()");
    }

    fn function_begin(&mut self, name: &str) {
        self.line(&format!("function({name})"));
        self.indent();
    }

    fn function_end(&mut self) {
        self.unindent();
        self.line("endfunction()");
    }

    fn function_call(&mut self, name: &str) {
        self.line(&format!("{name}()"));
    }

    // commands

    fn project(&mut self, project: &Project) {
        let mut args = String::new();
        if !project.version.is_empty() {
            args = format!(" VERSION {}", project.version);
        }

        self.line(&format!("project({}{})", project.name, args));
    }

    fn option(&mut self, name: &str, option: &OptionDecl) {
        self.line(&format!(
            "option({} {}{})",
            name,
            quote(&option.description),
            expression(&option.default, true)
        ));
    }

    fn set(&mut self, name: &str, expr: &Expression, force: bool) {
        let mut args = String::new();
        if force {
            args = format!(" CACHE INTERNAL {} FORCE", quote(""));
        }

        self.line(&format!("set({}{}{})", name, expression(expr, true), args));
    }

    fn find_package(&mut self, name: &str, package: &SystemPackage) {
        let mut args = String::new();

        if !package.version.is_empty() {
            args.push(' ');
            args.push_str(&package.version);
        }

        if package.is_required {
            args.push_str(" REQUIRED");
        }

        self.line(&format!("find_package({name}{args})"));
    }

    fn add_library(&mut self, name: &str, library_type: LibraryType) {
        let type_str = match library_type {
            LibraryType::Static => "STATIC",
            LibraryType::Shared => "SHARED",
            LibraryType::Interface => "INTERFACE",
            LibraryType::Object => "OBJECT",
        };

        self.line(&format!("add_library({name} {type_str})"));
    }

    fn add_library_alias(&mut self, name: &str, alias: &str) {
        self.line(&format!("add_library({alias} ALIAS {name})"));
    }

    fn add_executable(&mut self, name: &str) {
        self.line(&format!("add_executable({name})"));
    }

    // target settings

    fn target_settings(&mut self, name: &str, settings: &TargetSettings) {
        if !settings.sources.is_empty() {
            self.line(&format!("target_sources({name}"));
            self.indent();
            self.visibility_expressions(&settings.sources, &settings.path);
            self.unindent();
            self.line(")");
        }

        if !settings.includes.is_empty() {
            self.line(&format!("target_include_directories({name}"));
            self.indent();
            self.visibility_expressions(&settings.includes, &settings.path);
            self.unindent();
            self.line(")");
        }

        if !settings.pchs.is_empty() {
            self.line(&format!("target_precompiled_headers({name}"));
            self.indent();
            self.visibility_expressions(&settings.pchs, &settings.path);
            self.unindent();
            self.line(")");
        }

        if !settings.dependencies.is_empty() {
            self.line(&format!("target_link_libraries({name}"));
            self.indent();
            self.visibility_expressions(&settings.dependencies, &Expression::default());
            self.unindent();
            self.line(")");
        }

        if !settings.definitions.is_empty() {
            self.line(&format!("target_compile_definitions({name}"));
            self.indent();
            self.visibility_definitions(&settings.definitions);
            self.unindent();
            self.line(")");
        }

        if !settings.properties.is_empty() {
            self.line(&format!("set_target_properties({name} PROPERTIES"));
            self.indent();
            self.configs_map(&settings.properties);
            self.unindent();
            self.line(")");
        }

        if !settings.compile_options.is_empty() {
            self.line(&format!("target_compile_options({name}"));
            self.indent();
            self.visibility_expressions(&settings.compile_options, &Expression::default());
            self.unindent();
            self.line(")");
        }

        if !settings.link_options.is_empty() {
            self.line(&format!("target_link_options({name}"));
            self.indent();
            self.visibility_expressions(&settings.link_options, &Expression::default());
            self.unindent();
            self.line(")");
        }
    }

    fn visibility_expressions(&mut self, visibility: &VisibilityExpressions, prefix: &Expression) {
        for (keyword, configs) in [
            ("PUBLIC", &visibility.public),
            ("INTERFACE", &visibility.interface),
            ("PRIVATE", &visibility.private),
        ] {
            if configs.is_empty() {
                continue;
            }

            self.line(keyword);
            self.indent();
            self.configs_expressions(configs, prefix);
            self.unindent();
        }
    }

    fn visibility_definitions(&mut self, visibility: &VisibilityDefinitions) {
        for (keyword, configs) in [
            ("PUBLIC", &visibility.public),
            ("INTERFACE", &visibility.interface),
            ("PRIVATE", &visibility.private),
        ] {
            if configs.is_empty() {
                continue;
            }

            self.line(keyword);
            self.indent();
            self.configs_definitions(configs);
            self.unindent();
        }
    }

    fn configs_expressions(&mut self, configs: &ConfigsExpressions, prefix: &Expression) {
        for expr in &configs.global {
            self.item(&concatenate_paths(prefix, expr));
        }

        for (config_name, exprs) in &configs.configurations {
            if exprs.is_empty() {
                continue;
            }

            self.config_begin(config_name);
            for expr in exprs {
                self.item(&concatenate_paths(prefix, expr));
            }
            self.config_end();
        }
    }

    fn configs_definitions(&mut self, configs: &ConfigsDefinitions) {
        for def in &configs.global {
            self.definition(def);
        }

        for (config_name, defs) in &configs.configurations {
            if defs.is_empty() {
                continue;
            }

            self.config_begin(config_name);
            for def in defs {
                self.definition(def);
            }
            self.config_end();
        }
    }

    fn configs_map(&mut self, configs: &ConfigsExpressionsMap) {
        for (key, expr) in &configs.global {
            self.line(&format!("{}{}", key, expression(expr, true)));
        }

        for (config_name, map) in &configs.configurations {
            if map.is_empty() {
                continue;
            }

            self.config_begin(config_name);
            for (key, expr) in map {
                self.line(&format!("{}{}", key, expression(expr, true)));
            }
            self.config_end();
        }
    }

    fn config_begin(&mut self, config_name: &str) {
        self.line(&format!("$<$<CONFIG:{config_name}>:"));
        self.indent();
    }

    fn config_end(&mut self) {
        self.unindent();
        self.line(">");
    }

    fn item(&mut self, expr: &Expression) {
        if !expr.is_defined {
            return;
        }

        self.line(&expression(expr, false));
    }

    fn definition(&mut self, def: &Definition) {
        match def {
            Definition::Token(expr) => self.line(&expression(expr, false)),
            Definition::Map(map) => {
                for (key, expr) in map {
                    self.line(&format!("{}={}", key, expression(expr, false)));
                }
            }
        }
    }
}

// utility

fn quote(text: &str) -> String {
    format!("\"{text}\"")
}

fn expression(expr: &Expression, padded: bool) -> String {
    if !expr.is_defined {
        return String::new();
    }

    let mut result = String::new();
    if padded {
        result.push(' ');
    }

    if expr.is_quoted {
        result.push_str(&quote(&expr.value));
    } else {
        result.push_str(&expr.value);
    }

    result
}

fn concatenate_paths(lhs: &Expression, rhs: &Expression) -> Expression {
    let value = if lhs.value.is_empty() || rhs.value.starts_with('/') {
        rhs.value.clone()
    } else if rhs.value.is_empty() {
        format!("{}/", lhs.value)
    } else {
        format!("{}/{}", lhs.value, rhs.value)
    };

    Expression {
        is_defined: lhs.is_defined || rhs.is_defined,
        is_quoted: lhs.is_quoted || rhs.is_quoted,
        value,
    }
}

fn has_system_packages(config: &Config) -> bool {
    config
        .packages
        .iter()
        .any(|p| matches!(p.spec, PackageSpec::System(_)))
}

fn has_external_packages(config: &Config) -> bool {
    config
        .packages
        .iter()
        .any(|p| matches!(p.spec, PackageSpec::External(_)))
}

fn config_target_options(config: &Config) -> Vec<(&str, &IndexMap<String, OptionDecl>)> {
    config
        .targets
        .iter()
        .filter(|target| !target.settings().options.is_empty())
        .map(|target| (target.name.as_str(), &target.settings().options))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::*;
    use crate::config;
    use crate::util::fs::Files;

    struct NoFiles;

    impl Files for NoFiles {
        fn exists(&self, _path: &Path) -> bool {
            false
        }

        fn read(&self, _path: &Path) -> io::Result<String> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    /// Generate CMake for the config and strip the fixed header.
    fn generate_str(input: &str) -> String {
        let mut errors = Vec::new();
        let config = config::read(input, &NoFiles, &mut errors);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");

        let cmake = generate(&config);
        let header = format!(
            "# Generated using cgen {}\n# DO NOT EDIT\n\ncmake_minimum_required(VERSION {})\n",
            env!("CARGO_PKG_VERSION"),
            CMAKE_VERSION
        );
        let rest = cmake
            .strip_prefix(&header)
            .expect("generated CMake must start with the header");
        rest.to_string()
    }

    #[test]
    fn test_project_without_version() {
        let cmake = generate_str("project: name");
        assert_eq!(cmake, "project(name)\n");
    }

    #[test]
    fn test_project_with_version() {
        let cmake = generate_str(
            r#"
            project:
              name: name
              version: 1.0
            "#,
        );
        assert_eq!(cmake, "project(name VERSION 1.0)\n");
    }

    #[test]
    fn test_options_without_default() {
        let cmake = generate_str(
            r#"
            project: name
            options:
              OPTION1:
                description: Option 1
              OPTION2:
                description: Option 2
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Options
#

option(OPTION1 "Option 1")
option(OPTION2 "Option 2")
"#
        );
    }

    #[test]
    fn test_options_with_default() {
        let cmake = generate_str(
            r#"
            project: name
            options:
              OPTION1:
                description: Option 1
                default: Value
              OPTION2:
                description: Option 2
                default: "Quoted"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Options
#

option(OPTION1 "Option 1" Value)
option(OPTION2 "Option 2" "Quoted")
"#
        );
    }

    #[test]
    fn test_settings() {
        let cmake = generate_str(
            r#"
            project: name
            settings:
              VAR1: Value
              VAR2: "Quoted"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Settings
#

set(VAR1 Value)
set(VAR2 "Quoted")
"#
        );
    }

    #[test]
    fn test_system_packages() {
        let cmake = generate_str(
            r#"
            project: name
            packages:
              - system: Package1
              - system: Package2
                if: condition
                version: 1.0.0
                required: false
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# System packages
#

find_package(Package1 REQUIRED)
if(condition)
    find_package(Package2 1.0.0)
endif()
"#
        );
    }

    #[test]
    fn test_external_packages() {
        let cmake = generate_str(
            r#"
            project: name
            packages:
              - external: Package1
                url: https://external.com/repo.git
              - external: Package2
                if: condition
                url: https://external.com/repo.git
                version: 1.0.0
                options:
                  OPTION1: Value
                  OPTION2: "Quoted"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# External packages
#

# package Package1
function(cgen_package_0)
    if(EXISTS ${PROJECT_SOURCE_DIR}/Package1/CMakeLists.txt)
        add_subdirectory(Package1)
    else()
        message(NOTICE "Package Package1 doesn't have CMakeLists.txt")
    endif()
endfunction()
cgen_package_0()

# package Package2
function(cgen_package_1)
    set(OPTION1 Value CACHE INTERNAL "" FORCE)
    set(OPTION2 "Quoted" CACHE INTERNAL "" FORCE)
    if(EXISTS ${PROJECT_SOURCE_DIR}/Package2/CMakeLists.txt)
        add_subdirectory(Package2)
    else()
        message(NOTICE "Package Package2 doesn't have CMakeLists.txt")
    endif()
endfunction()
if(condition)
    cgen_package_1()
endif()
"#
        );
    }

    #[test]
    fn test_target_options() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                options:
                  OPTION1:
                    description: Description
                    default: Value
                  OPTION2:
                    description: Description
                    default: "Quoted"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Target options
#

# options for target library
option(OPTION1 "Description" Value)
option(OPTION2 "Description" "Quoted")

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_local_settings() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                settings:
                  VAR1: Value
                  VAR2: "Quoted"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    set(VAR1 Value)
    set(VAR2 "Quoted")
    add_library(library STATIC)
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_sources() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library1
                sources:
                  - path/to/file
              - library: library2
                sources:
                  public:
                    - path/to/file
              - library: library3
                sources:
                  public:
                    global:
                      - path/to/file
                    configurations:
                      Release:
                        - "path/to/file"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library1
function(cgen_target_0)
    add_library(library1 STATIC)
    target_sources(library1
        PRIVATE
            path/to/file
    )
endfunction()
cgen_target_0()

# target library2
function(cgen_target_1)
    add_library(library2 STATIC)
    target_sources(library2
        PUBLIC
            path/to/file
    )
endfunction()
cgen_target_1()

# target library3
function(cgen_target_2)
    add_library(library3 STATIC)
    target_sources(library3
        PUBLIC
            path/to/file
            $<$<CONFIG:Release>:
                "path/to/file"
            >
    )
endfunction()
cgen_target_2()
"#
        );
    }

    #[test]
    fn test_target_includes() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                includes:
                  public:
                    - path/to/dir
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_include_directories(library
        PUBLIC
            path/to/dir
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_pchs() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                pchs:
                  - path/to/pch
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_precompiled_headers(library
        PRIVATE
            path/to/pch
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_dependencies() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                dependencies:
                  public:
                    global:
                      - dependency
                    configurations:
                      Release:
                        - "dependency"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_link_libraries(library
        PUBLIC
            dependency
            $<$<CONFIG:Release>:
                "dependency"
            >
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_definitions() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                definitions:
                  public:
                    global:
                      - DEFINITION
                      - KEY: VALUE
                    configurations:
                      Release:
                        - "DEFINITION"
                        - KEY: "VALUE"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_compile_definitions(library
        PUBLIC
            DEFINITION
            KEY=VALUE
            $<$<CONFIG:Release>:
                "DEFINITION"
                KEY="VALUE"
            >
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_properties() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                properties:
                  global:
                    KEY: VALUE
                  configurations:
                    Release:
                      KEY: "VALUE"
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    set_target_properties(library PROPERTIES
        KEY VALUE
        $<$<CONFIG:Release>:
            KEY "VALUE"
        >
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_compile_and_link_options() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                compile_options:
                  - compile option
                link_options:
                  - link option
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_compile_options(library
        PRIVATE
            compile option
    )
    target_link_options(library
        PRIVATE
            link option
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_target_path_prefix() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                path: prefix
                sources:
                  - path/to/file
                includes:
                  - path/to/file
                pchs:
                  - path/to/file
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    target_sources(library
        PRIVATE
            prefix/path/to/file
    )
    target_include_directories(library
        PRIVATE
            prefix/path/to/file
    )
    target_precompiled_headers(library
        PRIVATE
            prefix/path/to/file
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_empty_target_settings_produce_no_blocks() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library1
                sources: []
              - library: library2
                sources:
                  public: []
              - library: library3
                sources:
                  public:
                    global: []
                    configurations:
                      Release: []
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library1
function(cgen_target_0)
    add_library(library1 STATIC)
endfunction()
cgen_target_0()

# target library2
function(cgen_target_1)
    add_library(library2 STATIC)
endfunction()
cgen_target_1()

# target library3
function(cgen_target_2)
    add_library(library3 STATIC)
endfunction()
cgen_target_2()
"#
        );
    }

    #[test]
    fn test_executable_target() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - executable: executable
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target executable
function(cgen_target_0)
    add_executable(executable)
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_conditional_library_with_aliases() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                type: static
                if: condition
                aliases:
                  - alias1
                  - alias2
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library STATIC)
    add_library(alias1 ALIAS library)
    add_library(alias2 ALIAS library)
endfunction()
if(condition)
    cgen_target_0()
endif()
"#
        );
    }

    #[test]
    fn test_library_types() {
        for (type_str, keyword) in [
            ("static", "STATIC"),
            ("shared", "SHARED"),
            ("object", "OBJECT"),
        ] {
            let cmake = generate_str(&format!(
                "project: name\ntargets:\n  - library: library\n    type: {type_str}\n"
            ));
            assert!(cmake.contains(&format!("add_library(library {keyword})")));
        }
    }

    #[test]
    fn test_interface_library() {
        let cmake = generate_str(
            r#"
            project: name
            targets:
              - library: library
                type: interface
                sources:
                  - path/to/file
                dependencies:
                  - dependency
                definitions:
                  - DEFINITION
                properties:
                  KEY: VALUE
                compile_options:
                  - option
                link_options:
                  - option
            "#,
        );
        assert_eq!(
            cmake,
            r#"project(name)

#
# Targets
#

# target library
function(cgen_target_0)
    add_library(library INTERFACE)
    target_sources(library
        INTERFACE
            path/to/file
    )
    target_link_libraries(library
        INTERFACE
            dependency
    )
    target_compile_definitions(library
        INTERFACE
            DEFINITION
    )
    set_target_properties(library PROPERTIES
        KEY VALUE
    )
    target_compile_options(library
        INTERFACE
            option
    )
    target_link_options(library
        INTERFACE
            option
    )
endfunction()
cgen_target_0()
"#
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let input = r#"
            project: name
            settings:
              VAR1: Value
            targets:
              - library: library
                sources: [ a, b ]
        "#;

        let mut errors = Vec::new();
        let config = config::read(input, &NoFiles, &mut errors);
        assert!(errors.is_empty());

        assert_eq!(generate(&config), generate(&config));
    }
}
