//! Recipe and project fixtures.

use std::path::{Path, PathBuf};

/// The canonical `beyond-core` recipe.
pub const BEYOND_CORE_RECIPE: &str = r#"
[package]
name = "beyond-core"
version = "0.0.2"
license = "MIT"
url = "https://github.com/Beyond-Engine/Core"
description = "Utility library for graphics and game programming"
topics = ["graphics programming", "gamedev", "math"]
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps"]
exports_sources = ["cmake/*", "include/*", "src/*", "CMakeLists.txt"]
requires = ["fmt/9.1.0", "backward-cpp/1.6"]
test_requires = ["catch2/3.3.2"]

[options]
shared = [true, false]

[default_options]
shared = false

[[copy]]
pattern = "*.hpp"
dst = "include"
src = "include"

[[copy]]
pattern = "*.lib"
dst = "lib"
keep_path = false

[[copy]]
pattern = "*.a"
dst = "lib"
keep_path = false

[[copy]]
pattern = "*.dll"
dst = "bin"
keep_path = false

[package_info]
libs = ["core"]
"#;

/// The older `beyond-core` recipe, written in the legacy dialect.
pub const BEYOND_CORE_LEGACY_RECIPE: &str = r#"
[package]
name = "beyond-core"
version = "0.0.1"
settings = ["os", "compiler", "build_type", "arch"]
generators = "cmake"
exports_sources = ["include/*", "src/*", "CMakeLists.txt"]
requires = ["fmt/6.1.2", "backward-cpp/1.5"]
build_requires = ["Catch2/2.13.9"]

[[copy]]
pattern = "*.hpp"
dst = "include"
src = "include"

[[copy]]
pattern = "*.a"
dst = "lib"
keep_path = false

[package_info]
libs = ["core"]
"#;

/// Headers of the `beyond-core` project, relative to the project root.
pub const BEYOND_CORE_HEADERS: &[&str] = &[
    "include/beyond/core/math/vector.hpp",
    "include/beyond/core/math/matrix.hpp",
    "include/beyond/core/utils/assert.hpp",
];

/// Write the `beyond-core` project (recipe plus sources) into `dir`.
///
/// Returns the recipe path.
pub fn write_beyond_core(dir: &Path) -> PathBuf {
    write_project(dir, BEYOND_CORE_RECIPE)
}

/// Write a `beyond-core` project tree with a custom recipe.
pub fn write_project(dir: &Path, recipe: &str) -> PathBuf {
    let files: &[(&str, &str)] = &[
        (
            "CMakeLists.txt",
            "cmake_minimum_required(VERSION 3.15)\nproject(beyond-core CXX)\n\
             find_package(fmt CONFIG REQUIRED)\nadd_library(core src/core.cpp)\n\
             target_link_libraries(core PUBLIC fmt::fmt)\n",
        ),
        ("cmake/compiler.cmake", "set(CMAKE_CXX_STANDARD 17)\n"),
        ("src/core.cpp", "#include <beyond/core/math/vector.hpp>\n"),
    ];

    for (path, contents) in files {
        write(dir, path, contents);
    }
    for header in BEYOND_CORE_HEADERS {
        write(dir, header, "#pragma once\n");
    }

    let recipe_path = dir.join("berth.toml");
    std::fs::write(&recipe_path, recipe).expect("failed to write recipe");
    recipe_path
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    std::fs::write(path, contents).expect("failed to write fixture file");
}
