//! Build driver - generators, then configure, then build.

use crate::builder::context::BuildContext;
use crate::builder::generators;
use crate::builder::tool::BuildTool;
use crate::core::{BuildStep, EvalError, GeneratorKind};
use crate::util::fs::ensure_dir;

/// Runs one build through a [`BuildTool`].
pub struct BuildDriver<'a> {
    tool: &'a dyn BuildTool,
}

impl<'a> BuildDriver<'a> {
    pub fn new(tool: &'a dyn BuildTool) -> Self {
        BuildDriver { tool }
    }

    /// Materialize generators and run the tool's configure and build steps.
    ///
    /// The first failure stops the build; nothing is retried.
    pub fn build(&self, generators: &[GeneratorKind], ctx: &BuildContext) -> Result<(), EvalError> {
        ensure_dir(&ctx.build_dir).map_err(|e| EvalError::BuildTool {
            tool: "berth".to_string(),
            step: BuildStep::Generate,
            status: None,
            output: format!("{:#}", e),
        })?;

        for &kind in generators {
            generators::generate(kind, ctx).map_err(|e| EvalError::BuildTool {
                tool: kind.to_string(),
                step: BuildStep::Generate,
                status: None,
                output: format!("{:#}", e),
            })?;
        }

        for step in [BuildStep::Configure, BuildStep::Build] {
            self.run_step(step, ctx)?;
        }

        Ok(())
    }

    fn run_step(&self, step: BuildStep, ctx: &BuildContext) -> Result<(), EvalError> {
        let tool = self.tool.name().to_string();

        let output = self
            .tool
            .run(step, ctx)
            .map_err(|e| EvalError::BuildTool {
                tool: tool.clone(),
                step,
                status: None,
                output: format!("{:#}", e),
            })?;

        if !output.succeeded() {
            tracing::debug!("{} {} output:\n{}{}", tool, step, output.stdout, output.stderr);
            return Err(EvalError::BuildTool {
                tool,
                step,
                status: output.status,
                output: output.diagnostics(),
            });
        }

        tracing::debug!("{} {} finished", tool, step);
        Ok(())
    }
}
