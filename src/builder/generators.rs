//! Generators - build-tool glue materialized before configure.
//!
//! `CMakeToolchain` writes a toolchain file carrying the resolved
//! configuration; `CMakeDeps` writes one package config per dependency so
//! `find_package(<dep> CONFIG)` finds the dependency's install prefix.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::core::GeneratorKind;
use crate::resolver::ResolvedDependency;
use crate::util::fs::write_string;

/// File written by the `CMakeToolchain` generator.
pub const TOOLCHAIN_FILE: &str = "berth_toolchain.cmake";

/// Materialize one generator into the context's generators folder.
///
/// Returns the files written.
pub fn generate(kind: GeneratorKind, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let dir = ctx.generators_dir();

    let files = match kind {
        GeneratorKind::CMakeToolchain => {
            let path = dir.join(TOOLCHAIN_FILE);
            write_string(&path, &cmake_toolchain(ctx, &dir))?;
            vec![path]
        }
        GeneratorKind::CMakeDeps => {
            let mut files = Vec::new();
            for dep in ctx.dependencies.iter() {
                let stem = dep.name().to_lowercase();

                let config = dir.join(format!("{}-config.cmake", stem));
                write_string(&config, &cmake_deps_config(dep))?;

                let version = dir.join(format!("{}-config-version.cmake", stem));
                write_string(&version, &cmake_deps_version(dep))?;

                files.push(config);
                files.push(version);
            }
            files
        }
    };

    tracing::debug!("{} wrote {} file(s) into {}", kind, files.len(), dir.display());
    Ok(files)
}

/// CMake wants forward slashes even on Windows.
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn cmake_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(";")
}

fn cmake_toolchain(ctx: &BuildContext, generators_dir: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Generated by berth for {}", ctx.reference());
    let _ = writeln!(out, "# package id {}", ctx.package_id);
    out.push('\n');

    let _ = writeln!(
        out,
        "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"\" FORCE)",
        ctx.build_type()
    );

    if let Some(shared) = ctx.shared() {
        let _ = writeln!(
            out,
            "set(BUILD_SHARED_LIBS {} CACHE BOOL \"\" FORCE)",
            if shared { "ON" } else { "OFF" }
        );
    }

    for (axis, value) in ctx.settings.iter() {
        let _ = writeln!(out, "set(BERTH_SETTING_{} \"{}\")", axis.to_uppercase(), value);
    }
    for (option, value) in &ctx.options {
        let _ = writeln!(out, "set(BERTH_OPTION_{} \"{}\")", option.to_uppercase(), value);
    }

    out.push('\n');
    let generators = cmake_path(generators_dir);
    let _ = writeln!(out, "list(PREPEND CMAKE_PREFIX_PATH \"{}\")", generators);
    for dep in ctx.dependencies.iter() {
        let _ = writeln!(
            out,
            "list(APPEND CMAKE_PREFIX_PATH \"{}\")",
            cmake_path(&dep.install_prefix)
        );
    }
    for dep in ctx.dependencies.iter() {
        let _ = writeln!(out, "set({}_DIR \"{}\")", dep.name(), generators);
    }

    out
}

fn cmake_deps_config(dep: &ResolvedDependency) -> String {
    let name = dep.name();
    let target = format!("{0}::{0}", name);
    let include_dirs: Vec<String> = dep.include_paths().iter().map(|p| cmake_path(p)).collect();
    let lib_dirs: Vec<String> = dep.lib_paths().iter().map(|p| cmake_path(p)).collect();

    let mut out = String::new();
    let _ = writeln!(out, "# Generated by berth for {}", dep.requirement);
    out.push('\n');
    let _ = writeln!(out, "set({}_VERSION \"{}\")", name, dep.version());
    let _ = writeln!(
        out,
        "set({}_INCLUDE_DIRS \"{}\")",
        name,
        cmake_list(include_dirs.iter().map(String::as_str))
    );
    let _ = writeln!(
        out,
        "set({}_LIB_DIRS \"{}\")",
        name,
        cmake_list(lib_dirs.iter().map(String::as_str))
    );
    let _ = writeln!(
        out,
        "set({}_LIBRARIES \"{}\")",
        name,
        cmake_list(dep.info.libs.iter().map(String::as_str))
    );
    out.push('\n');

    let _ = writeln!(out, "if(NOT TARGET {})", target);
    let _ = writeln!(out, "  add_library({} INTERFACE IMPORTED)", target);
    let _ = writeln!(
        out,
        "  set_target_properties({} PROPERTIES INTERFACE_INCLUDE_DIRECTORIES \"${{{}_INCLUDE_DIRS}}\")",
        target, name
    );
    let _ = writeln!(out, "  foreach(_berth_lib IN LISTS {}_LIBRARIES)", name);
    let _ = writeln!(
        out,
        "    find_library(_berth_{}_${{_berth_lib}} NAMES ${{_berth_lib}} PATHS ${{{}_LIB_DIRS}} NO_DEFAULT_PATH)",
        name, name
    );
    let _ = writeln!(out, "    if(_berth_{}_${{_berth_lib}})", name);
    let _ = writeln!(
        out,
        "      target_link_libraries({} INTERFACE \"${{_berth_{}_${{_berth_lib}}}}\")",
        target, name
    );
    out.push_str("    else()\n");
    let _ = writeln!(
        out,
        "      target_link_libraries({} INTERFACE \"${{_berth_lib}}\")",
        target
    );
    out.push_str("    endif()\n");
    out.push_str("  endforeach()\n");
    out.push_str("endif()\n\n");
    let _ = writeln!(out, "set({}_FOUND TRUE)", name);

    out
}

fn cmake_deps_version(dep: &ResolvedDependency) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Generated by berth for {}", dep.requirement);
    let _ = writeln!(out, "set(PACKAGE_VERSION \"{}\")", dep.version());
    out.push_str(
        "if(NOT PACKAGE_FIND_VERSION OR PACKAGE_FIND_VERSION VERSION_LESS_EQUAL PACKAGE_VERSION)\n\
         \x20 set(PACKAGE_VERSION_COMPATIBLE TRUE)\n\
         endif()\n\
         if(PACKAGE_FIND_VERSION VERSION_EQUAL PACKAGE_VERSION)\n\
         \x20 set(PACKAGE_VERSION_EXACT TRUE)\n\
         endif()\n",
    );
    out
}
