//! Build step for compiled languages: stage the source next to the fixtures and compile it once

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use casecheck_common::types::BuildFailure;
use casecheck_common::HarnessError;
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::CommandTemplate;

pub const STAGED_SOURCE_STEM: &str = "temp_solution";
pub const ARTIFACT_STEM: &str = "solution_exec";

/// Where the staged source and the compiled artifact live for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub staged_source: PathBuf,
    pub artifact: PathBuf,
}

impl BuildPlan {
    pub fn new(fixture_dir: &Path, solution: &Path) -> Self {
        let staged_name = match solution.extension() {
            Some(ext) => format!("{}.{}", STAGED_SOURCE_STEM, ext.to_string_lossy()),
            None => STAGED_SOURCE_STEM.to_string(),
        };

        Self {
            staged_source: fixture_dir.join(staged_name),
            artifact: fixture_dir.join(format!("{}{}", ARTIFACT_STEM, std::env::consts::EXE_SUFFIX)),
        }
    }
}

/// Successful compilation
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Warnings the compiler printed on success
    pub diagnostics: String,
    pub elapsed_ms: u64,
}

/// Copy the user's solution into the fixture directory
pub async fn stage_source(solution: &Path, plan: &BuildPlan) -> Result<(), HarnessError> {
    fs::copy(solution, &plan.staged_source)
        .await
        .map_err(|e| HarnessError::io(solution, e))?;

    // A stale artifact from an earlier run must not survive a failed build
    match fs::remove_file(&plan.artifact).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(HarnessError::io(&plan.artifact, e)),
    }

    Ok(())
}

/// Run the compiler and wait for it. Any non-zero exit or spawn failure is a build failure.
#[tracing::instrument(skip(compiler, plan), fields(source = %plan.staged_source.display()))]
pub async fn compile(compiler: &CommandTemplate, plan: &BuildPlan) -> Result<BuildOutput, BuildFailure> {
    let command = compiler.render(&plan.staged_source, &plan.artifact);
    info!(command = %command, "Compiling solution");

    let start = Instant::now();
    let output = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to launch compiler");
            BuildFailure {
                exit_code: None,
                diagnostics: format!("Failed to launch `{}`: {}", command, e),
            }
        })?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let diagnostics = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr
        };
        warn!(
            elapsed_ms,
            exit_code = ?output.status.code(),
            error_preview = diagnostics.lines().next().unwrap_or(""),
            "Compilation failed"
        );
        return Err(BuildFailure {
            exit_code: output.status.code(),
            diagnostics,
        });
    }

    if !stderr.is_empty() {
        warn!(diagnostics = %stderr, "Compiler reported diagnostics");
    }
    info!(elapsed_ms, "Compilation successful");

    Ok(BuildOutput {
        diagnostics: stderr,
        elapsed_ms,
    })
}
