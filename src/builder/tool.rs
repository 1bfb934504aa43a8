//! The build tool seam.
//!
//! The build driver only knows how to ask a tool to configure and build;
//! what the tool actually runs is behind [`BuildTool`].

use std::process::Output;

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::core::BuildStep;

/// Lines of captured output kept in a failure report.
const DIAGNOSTIC_TAIL_LINES: usize = 40;

/// Exit status and captured output of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful invocation with no output.
    pub fn success() -> Self {
        ToolOutput {
            status: Some(0),
            ..Default::default()
        }
    }

    /// A failed invocation with the given exit code and stderr.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        ToolOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the tool exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }

    /// The tail of the captured output, stderr preferred.
    ///
    /// Build tools often report the actual error on stdout, so stdout is used
    /// when stderr is empty.
    pub fn diagnostics(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };

        let lines: Vec<&str> = text.trim_end().lines().collect();
        let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
        lines[start..].join("\n")
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// An external build system.
pub trait BuildTool: Send + Sync {
    /// Tool name for display and error reports.
    fn name(&self) -> &str;

    /// Run one step (`Configure` or `Build`) against the context's folders.
    ///
    /// A non-zero exit is reported through [`ToolOutput::status`]; `Err` means
    /// the tool could not be run at all.
    fn run(&self, step: BuildStep, ctx: &BuildContext) -> Result<ToolOutput>;
}
