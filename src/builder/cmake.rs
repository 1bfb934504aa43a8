//! CMake build tool.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::context::BuildContext;
use crate::builder::generators::TOOLCHAIN_FILE;
use crate::builder::tool::{BuildTool, ToolOutput};
use crate::core::BuildStep;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Drives `cmake` for the configure and build steps.
#[derive(Debug, Clone, Default)]
pub struct CMakeTool {
    /// Explicit cmake executable; `PATH` lookup when unset
    program: Option<PathBuf>,

    /// Generator passed as `-G`
    generator: Option<String>,
}

impl CMakeTool {
    /// Create a tool that finds cmake on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit cmake executable.
    pub fn with_program(mut self, program: Option<PathBuf>) -> Self {
        self.program = program;
        self
    }

    /// Use a specific CMake generator.
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    fn program(&self) -> Result<PathBuf> {
        if let Some(ref program) = self.program {
            return Ok(program.clone());
        }
        match find_cmake() {
            Some(path) => Ok(path),
            None => bail!(
                "cmake not found\n\
                 \n\
                 CMake is required to build this recipe.\n\
                 Install CMake and ensure it's in your PATH, or set `[build] cmake` in config."
            ),
        }
    }

    /// Command for the configure step.
    pub fn configure_command(&self, program: &Path, ctx: &BuildContext) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(program)
            .arg("-S")
            .arg(&ctx.source_dir)
            .arg("-B")
            .arg(&ctx.build_dir);

        if let Some(ref generator) = self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        cmd = cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", ctx.build_type()));

        let toolchain = ctx.generators_dir().join(TOOLCHAIN_FILE);
        if toolchain.is_file() {
            cmd = cmd.arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));
        }

        // Prefixes are passed directly too, so recipes without generators still
        // find their dependencies.
        if !ctx.dependencies.is_empty() {
            let prefixes: Vec<String> = ctx
                .dependencies
                .prefixes()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            cmd = cmd.arg(format!("-DCMAKE_PREFIX_PATH={}", prefixes.join(";")));
        }

        for (axis, value) in ctx.settings.iter() {
            cmd = cmd.arg(format!("-DBERTH_SETTING_{}={}", axis.to_uppercase(), value));
        }

        if let Some(shared) = ctx.shared() {
            cmd = cmd.arg(format!(
                "-DBUILD_SHARED_LIBS={}",
                if shared { "ON" } else { "OFF" }
            ));
        }

        cmd.arg("-DCMAKE_POSITION_INDEPENDENT_CODE=ON")
            .cwd(&ctx.build_dir)
    }

    /// Command for the build step.
    pub fn build_command(&self, program: &Path, ctx: &BuildContext) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(program)
            .arg("--build")
            .arg(&ctx.build_dir)
            // Multi-config generators (Visual Studio, Xcode) pick the config here
            .arg("--config")
            .arg(ctx.build_type())
            .arg("--parallel");

        if let Some(jobs) = ctx.jobs {
            cmd = cmd.arg(jobs.to_string());
        }

        cmd.cwd(&ctx.build_dir)
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn run(&self, step: BuildStep, ctx: &BuildContext) -> Result<ToolOutput> {
        let program = self.program()?;
        ensure_dir(&ctx.build_dir)?;

        let cmd = match step {
            BuildStep::Configure => {
                tracing::info!("Configuring {} with CMake", ctx.reference());
                self.configure_command(&program, ctx)
            }
            BuildStep::Build => {
                tracing::info!("Building {} with CMake", ctx.reference());
                self.build_command(&program, ctx)
            }
            other => bail!("cmake does not handle the {} step", other),
        };

        let output = cmd.exec()?;
        Ok(ToolOutput::from(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_in, context_with_deps, MemoryService};
    use tempfile::TempDir;

    #[test]
    fn test_configure_command() {
        let tmp = TempDir::new().unwrap();
        let ctx = context_in(
            tmp.path(),
            &[("os", "Linux"), ("build_type", "Debug")],
            &[("shared", "true")],
        );

        let cmd = CMakeTool::new()
            .with_generator(Some("Ninja".into()))
            .configure_command(Path::new("cmake"), &ctx);
        let args = cmd.get_args();

        assert_eq!(args[0], "-S");
        assert_eq!(args[1], ctx.source_dir.display().to_string());
        assert_eq!(args[2], "-B");
        assert_eq!(args[3], ctx.build_dir.display().to_string());
        assert_eq!(&args[4..6], ["-G", "Ninja"]);
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Debug".to_string()));
        assert!(args.contains(&"-DBERTH_SETTING_OS=Linux".to_string()));
        assert!(args.contains(&"-DBUILD_SHARED_LIBS=ON".to_string()));
        assert!(args.contains(&"-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string()));
        // No toolchain generated, no dependencies
        assert!(!args.iter().any(|a| a.starts_with("-DCMAKE_TOOLCHAIN_FILE")));
        assert!(!args.iter().any(|a| a.starts_with("-DCMAKE_PREFIX_PATH")));
    }

    #[test]
    fn test_configure_passes_toolchain_and_prefixes() {
        let tmp = TempDir::new().unwrap();
        let service = MemoryService::new()
            .with_package("fmt", "9.1.0")
            .with_package("backward-cpp", "1.6");
        let ctx = context_with_deps(
            tmp.path(),
            &service,
            &["fmt/9.1.0", "backward-cpp/1.6"],
            &[],
            &[],
        );
        std::fs::create_dir_all(ctx.generators_dir()).unwrap();
        std::fs::write(ctx.generators_dir().join(TOOLCHAIN_FILE), "").unwrap();

        let cmd = CMakeTool::new().configure_command(Path::new("cmake"), &ctx);
        let args = cmd.get_args();

        let prefixes = ctx.dependencies.prefixes();
        let expected = format!(
            "-DCMAKE_PREFIX_PATH={};{}",
            prefixes[0].display(),
            prefixes[1].display()
        );
        assert!(args.contains(&expected));
        assert!(args
            .iter()
            .any(|a| a.starts_with("-DCMAKE_TOOLCHAIN_FILE=") && a.ends_with(TOOLCHAIN_FILE)));
    }

    #[test]
    fn test_build_command() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context_in(tmp.path(), &[("build_type", "Release")], &[]);
        ctx.jobs = Some(8);

        let cmd = CMakeTool::new().build_command(Path::new("cmake"), &ctx);
        assert_eq!(
            cmd.get_args(),
            [
                "--build".to_string(),
                ctx.build_dir.display().to_string(),
                "--config".to_string(),
                "Release".to_string(),
                "--parallel".to_string(),
                "8".to_string(),
            ]
        );
        assert_eq!(cmd.get_cwd(), Some(ctx.build_dir.as_path()));
    }

    #[test]
    fn test_missing_explicit_program_fails_to_spawn() {
        let tmp = TempDir::new().unwrap();
        let ctx = context_in(tmp.path(), &[], &[]);

        let tool = CMakeTool::new().with_program(Some(tmp.path().join("no-such-cmake")));
        let err = tool.run(BuildStep::Configure, &ctx).unwrap_err();
        assert!(err.to_string().contains("failed to spawn"));
    }
}
