//! Recipe evaluation: parse, resolve, build, package, export info.
//!
//! Stages run strictly in order on the calling thread. Any failure stops the
//! pipeline and surfaces unmodified; stages already completed are not undone,
//! and the package root is only touched once the build has succeeded.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::{package_id, BuildContext, BuildDriver, BuildTool};
use crate::core::options::resolve_options;
use crate::core::settings::resolve_settings;
use crate::core::{ConsumerInfo, EvalError, Recipe, Settings};
use crate::ops::package::{package, PackageReport};
use crate::ops::package_info::export_info;
use crate::ops::source_export::export_sources;
use crate::resolver::{resolve, Resolve, ResolveMode};
use crate::sources::PackageService;

/// Per-invocation inputs.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Whether test-only requirements participate
    pub mode: ResolveMode,

    /// Setting values from the command line
    pub setting_overrides: BTreeMap<String, String>,

    /// Setting values from config
    pub setting_defaults: BTreeMap<String, String>,

    /// Option values from the command line
    pub option_overrides: BTreeMap<String, String>,

    /// Root for the source, build and package folders
    /// (default `<recipe dir>/.berth/out/<package id prefix>`)
    pub output_dir: Option<PathBuf>,

    /// Parallel job count passed to the build tool
    pub jobs: Option<usize>,
}

/// A completed pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsed,
    DependenciesResolved,
    Built,
    Packaged,
    InfoExported,
}

impl Stage {
    /// The stage that must follow this one.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Parsed => Some(Stage::DependenciesResolved),
            Stage::DependenciesResolved => Some(Stage::Built),
            Stage::Built => Some(Stage::Packaged),
            Stage::Packaged => Some(Stage::InfoExported),
            Stage::InfoExported => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Parsed => "parsed",
            Stage::DependenciesResolved => "dependencies resolved",
            Stage::Built => "built",
            Stage::Packaged => "packaged",
            Stage::InfoExported => "info exported",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Nothing has completed yet.
    #[default]
    Pending,
    /// The given stage is the last one completed.
    Reached(Stage),
    /// A stage failed; `after` is the last stage that completed.
    Failed { after: Option<Stage> },
}

impl Lifecycle {
    /// Move to `stage`, which must directly follow the current one.
    fn advance(&mut self, stage: Stage) {
        let expected = match *self {
            Lifecycle::Pending => Some(Stage::Parsed),
            Lifecycle::Reached(current) => current.next(),
            Lifecycle::Failed { .. } => None,
        };
        debug_assert_eq!(expected, Some(stage), "stage out of order");
        *self = Lifecycle::Reached(stage);
    }

    fn fail(&mut self) {
        let after = match *self {
            Lifecycle::Reached(stage) => Some(stage),
            _ => None,
        };
        *self = Lifecycle::Failed { after };
    }
}

/// Result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub recipe: Recipe,
    pub settings: Settings,
    pub options: BTreeMap<String, String>,
    pub package_id: String,
    pub dependencies: Resolve,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,

    /// Root of the assembled package
    pub package_dir: PathBuf,

    pub report: PackageReport,
    pub info: ConsumerInfo,

    /// Completed stages, in order
    pub stages: Vec<Stage>,
}

/// Evaluate the recipe at `recipe_path`.
pub fn evaluate(
    recipe_path: &Path,
    opts: &EvalOptions,
    service: &dyn PackageService,
    tool: &dyn BuildTool,
) -> Result<Evaluation, EvalError> {
    evaluate_with(recipe_path, opts, service, tool, |_| {})
}

/// Evaluate the recipe, reporting every lifecycle transition to `on_change`:
/// `Reached(stage)` as each stage completes, then `Failed { after }` if a
/// stage fails.
pub fn evaluate_with(
    recipe_path: &Path,
    opts: &EvalOptions,
    service: &dyn PackageService,
    tool: &dyn BuildTool,
    mut on_change: impl FnMut(Lifecycle),
) -> Result<Evaluation, EvalError> {
    let mut lifecycle = Lifecycle::default();
    let mut stages = Vec::new();

    let mut complete = |stage: Stage, lifecycle: &mut Lifecycle| {
        lifecycle.advance(stage);
        tracing::info!("{}", stage);
        stages.push(stage);
        on_change(*lifecycle);
    };

    let result = run(recipe_path, opts, service, tool, &mut lifecycle, &mut complete);

    match result {
        Ok(mut evaluation) => {
            evaluation.stages = stages;
            Ok(evaluation)
        }
        Err(err) => {
            lifecycle.fail();
            if let Lifecycle::Failed { after } = lifecycle {
                match after {
                    Some(stage) => tracing::debug!(
                        "{} stage failed after `{}`: {}",
                        err.stage(),
                        stage,
                        err
                    ),
                    None => tracing::debug!(
                        "{} stage failed before any stage completed: {}",
                        err.stage(),
                        err
                    ),
                }
            }
            on_change(lifecycle);
            Err(err)
        }
    }
}

fn run(
    recipe_path: &Path,
    opts: &EvalOptions,
    service: &dyn PackageService,
    tool: &dyn BuildTool,
    lifecycle: &mut Lifecycle,
    complete: &mut impl FnMut(Stage, &mut Lifecycle),
) -> Result<Evaluation, EvalError> {
    // Parse
    let recipe = Recipe::load(recipe_path)?;
    let settings = resolve_settings(
        &recipe.settings,
        &opts.setting_overrides,
        &opts.setting_defaults,
    )
    .map_err(|e| e.at_path(recipe_path))?;
    let options = resolve_options(
        &recipe.options,
        &recipe.default_options,
        &opts.option_overrides,
    )
    .map_err(|e| e.at_path(recipe_path))?;
    let id = package_id(
        &recipe.name,
        &recipe.version,
        &settings,
        &options,
        &recipe.requires,
    );
    complete(Stage::Parsed, lifecycle);

    // Resolve
    let dependencies = resolve(&recipe, opts.mode, service)?;
    complete(Stage::DependenciesResolved, lifecycle);

    // Build
    let out = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&recipe, &id));
    let source_dir = export_sources(&recipe, &out.join("source"))?;

    let ctx = BuildContext {
        name: recipe.name.clone(),
        version: recipe.version.clone(),
        settings: settings.clone(),
        options: options.clone(),
        dependencies,
        source_dir,
        build_dir: out.join("build"),
        package_dir: out.join("package"),
        package_id: id.clone(),
        jobs: opts.jobs,
    };

    BuildDriver::new(tool).build(&recipe.generators, &ctx)?;
    complete(Stage::Built, lifecycle);

    // Package
    let report = package(
        &recipe.copy_rules,
        &ctx.source_dir,
        &ctx.build_dir,
        &ctx.package_dir,
    )?;
    complete(Stage::Packaged, lifecycle);

    // Export consumer info
    let info = export_info(&recipe, Some(&id), &ctx.package_dir)?;
    complete(Stage::InfoExported, lifecycle);

    Ok(Evaluation {
        recipe,
        settings,
        options,
        package_id: id,
        dependencies: ctx.dependencies,
        source_dir: ctx.source_dir,
        build_dir: ctx.build_dir,
        package_dir: ctx.package_dir,
        report,
        info,
        stages: Vec::new(),
    })
}

/// `<recipe dir>/.berth/out/<first 16 chars of the package id>`
pub fn default_output_dir(recipe: &Recipe, package_id: &str) -> PathBuf {
    let short = package_id.get(..16).unwrap_or(package_id);
    recipe.recipe_dir.join(".berth").join("out").join(short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildStep;
    use crate::test_support::{
        write_beyond_core, write_project, MemoryService, ScriptedTool, BEYOND_CORE_HEADERS,
        BEYOND_CORE_LEGACY_RECIPE,
    };
    use tempfile::TempDir;

    fn service() -> MemoryService {
        let service = MemoryService::new()
            .with_package("fmt", "9.1.0")
            .with_package("backward-cpp", "1.6")
            .with_package("catch2", "3.3.2");
        let mut fmt = ConsumerInfo::bare("fmt", "9.1.0");
        fmt.libs = vec!["fmt".to_string()];
        service.publish(&fmt);
        service
    }

    fn opts(out: &Path) -> EvalOptions {
        let mut opts = EvalOptions {
            output_dir: Some(out.to_path_buf()),
            ..Default::default()
        };
        for (axis, value) in [
            ("os", "Linux"),
            ("compiler", "gcc"),
            ("build_type", "Release"),
            ("arch", "x86_64"),
        ] {
            opts.setting_overrides.insert(axis.into(), value.into());
        }
        opts
    }

    #[test]
    fn test_beyond_core_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let out = tmp.path().join("out");
        let tool = ScriptedTool::new().with_artifact("libcore.a", "archive");

        let evaluation = evaluate(&recipe_path, &opts(&out), &service(), &tool).unwrap();

        let package = &evaluation.package_dir;
        assert_eq!(package, &out.join("package"));
        for header in BEYOND_CORE_HEADERS {
            assert!(package.join(header).is_file(), "missing {}", header);
        }
        assert!(package.join("lib/libcore.a").is_file());
        assert!(!package.join("src").exists());

        let info = ConsumerInfo::load(package).unwrap();
        assert_eq!(info.libs, vec!["core"]);
        assert_eq!(info.package_id.as_deref(), Some(evaluation.package_id.as_str()));
        assert_eq!(evaluation.info, info);

        assert_eq!(evaluation.settings.get("os"), Some("Linux"));
        assert_eq!(evaluation.options["shared"], "false");
        assert_eq!(evaluation.source_dir, out.join("source"));
        assert!(!evaluation.dependencies.contains("catch2"));

        // Generators were in place before configure
        let generated = tool.generator_files();
        assert!(generated.contains(&PathBuf::from("berth_toolchain.cmake")));
        assert!(generated.contains(&PathBuf::from("fmt-config.cmake")));
        assert!(generated.contains(&PathBuf::from("backward-cpp-config.cmake")));
    }

    #[test]
    fn test_stages_complete_in_order() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let tool = ScriptedTool::new();

        let mut seen = Vec::new();
        let evaluation = evaluate_with(
            &recipe_path,
            &opts(&tmp.path().join("out")),
            &service(),
            &tool,
            |state| seen.push(state),
        )
        .unwrap();

        let expected = vec![
            Stage::Parsed,
            Stage::DependenciesResolved,
            Stage::Built,
            Stage::Packaged,
            Stage::InfoExported,
        ];
        let reached: Vec<_> = expected.iter().map(|s| Lifecycle::Reached(*s)).collect();
        assert_eq!(seen, reached);
        assert_eq!(evaluation.stages, expected);
    }

    #[test]
    fn test_test_mode_resolves_test_requires() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let mut opts = opts(&tmp.path().join("out"));
        opts.mode = ResolveMode::Test;

        let evaluation = evaluate(&recipe_path, &opts, &service(), &ScriptedTool::new()).unwrap();
        assert!(evaluation.dependencies.contains("catch2"));
    }

    #[test]
    fn test_unresolved_dependency_stops_before_build() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let service = MemoryService::new().with_package("fmt", "9.1.0");
        let tool = ScriptedTool::new();

        let mut seen = Vec::new();
        let err = evaluate_with(
            &recipe_path,
            &opts(&tmp.path().join("out")),
            &service,
            &tool,
            |state| seen.push(state),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EvalError::UnresolvedDependency { ref specifier, .. } if specifier == "backward-cpp/1.6"
        ));
        assert_eq!(
            seen,
            vec![
                Lifecycle::Reached(Stage::Parsed),
                Lifecycle::Failed {
                    after: Some(Stage::Parsed)
                },
            ]
        );
        assert!(tool.steps().is_empty());
    }

    #[test]
    fn test_build_failure_leaves_package_untouched() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let out = tmp.path().join("out");
        std::fs::create_dir_all(out.join("package")).unwrap();
        std::fs::write(out.join("package/previous.txt"), "previous run").unwrap();

        let tool = ScriptedTool::new().failing_at(BuildStep::Build, 2, "undefined reference to `fmt::v9::vformat`");
        let err = evaluate(&recipe_path, &opts(&out), &service(), &tool).unwrap_err();

        match err {
            EvalError::BuildTool { step, status, ref output, .. } => {
                assert_eq!(step, BuildStep::Build);
                assert_eq!(status, Some(2));
                assert!(output.contains("fmt::v9::vformat"));
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            std::fs::read_to_string(out.join("package/previous.txt")).unwrap(),
            "previous run"
        );
        assert!(!out.join("package/package_info.toml").exists());
    }

    #[test]
    fn test_malformed_recipe_reaches_no_stage() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_project(
            tmp.path(),
            "[package]\nname = \"core\"\nversion = \"1.0\"\n\n[options]\nshared = [true, false]\n\n[default_options]\nshared = \"maybe\"\n",
        );

        let mut seen = Vec::new();
        let err = evaluate_with(
            &recipe_path,
            &EvalOptions::default(),
            &service(),
            &ScriptedTool::new(),
            |state| seen.push(state),
        )
        .unwrap_err();

        assert!(matches!(err, EvalError::MalformedRecipe { .. }));
        assert_eq!(seen, vec![Lifecycle::Failed { after: None }]);
    }

    #[test]
    fn test_invalid_option_override() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(tmp.path());
        let mut opts = opts(&tmp.path().join("out"));
        opts.option_overrides.insert("shared".into(), "sometimes".into());

        let err = evaluate(&recipe_path, &opts, &service(), &ScriptedTool::new()).unwrap_err();
        match err {
            EvalError::MalformedRecipe { path, .. } => assert_eq!(path, Some(recipe_path)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_legacy_recipe_evaluates() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_project(&tmp.path().join("project"), BEYOND_CORE_LEGACY_RECIPE);
        let service = MemoryService::new()
            .with_package("fmt", "6.1.2")
            .with_package("backward-cpp", "1.5");
        let tool = ScriptedTool::new().with_artifact("lib/libcore.a", "archive");

        let evaluation =
            evaluate(&recipe_path, &opts(&tmp.path().join("out")), &service, &tool).unwrap();
        assert!(evaluation.package_dir.join("lib/libcore.a").is_file());
        assert!(tool
            .generator_files()
            .contains(&PathBuf::from("berth_toolchain.cmake")));
    }

    #[test]
    fn test_default_output_dir_under_recipe() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(tmp.path());
        let mut opts = opts(tmp.path());
        opts.output_dir = None;

        let evaluation = evaluate(&recipe_path, &opts, &service(), &ScriptedTool::new()).unwrap();
        let expected = tmp
            .path()
            .join(".berth/out")
            .join(&evaluation.package_id[..16])
            .join("package");
        assert_eq!(evaluation.package_dir, expected);
        // Sources were exported next to, not into, the recipe directory
        assert!(!evaluation.source_dir.join(".berth").exists());
    }

    #[test]
    fn test_build_failure_reports_last_completed_stage() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(&tmp.path().join("project"));
        let tool = ScriptedTool::new().failing_at(BuildStep::Configure, 1, "CMake Error");

        let mut last = Lifecycle::default();
        evaluate_with(
            &recipe_path,
            &opts(&tmp.path().join("out")),
            &service(),
            &tool,
            |state| last = state,
        )
        .unwrap_err();

        assert_eq!(
            last,
            Lifecycle::Failed {
                after: Some(Stage::DependenciesResolved)
            }
        );
    }

    #[test]
    fn test_lifecycle_records_failure_point() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.advance(Stage::Parsed);
        lifecycle.advance(Stage::DependenciesResolved);
        lifecycle.fail();
        assert_eq!(
            lifecycle,
            Lifecycle::Failed {
                after: Some(Stage::DependenciesResolved)
            }
        );
    }
}
