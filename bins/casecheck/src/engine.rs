/// Execution Engine - Local Process Execution
///
/// **Core Responsibility:**
/// Launch the solution once for a fixture, push the fixture input through
/// stdin and capture raw stdout/stderr.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to run a program (command line, pipes, deadline)
/// - Engine does NOT compare outputs
/// - Engine returns raw outputs for the Evaluator to judge
///
/// **Process Lifecycle (per fixture):**
/// 1. Spawn with piped stdin/stdout/stderr
/// 2. Write the whole input, then close stdin
/// 3. Drain stdout and stderr until the process exits
/// 4. If the deadline passes first, the child is killed and the case is
///    marked as timed out
///
/// No retries: one invocation per fixture is authoritative.

use casecheck_common::types::Fixture;
use anyhow::{Context, Result};
use std::fmt;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Program plus arguments, already rendered from a language template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Raw execution output for a single fixture
/// Produced by ProcessEngine, consumed by Evaluator
#[derive(Debug, Clone, Default)]
pub struct CaseExecution {
    pub index: u32,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
    pub timed_out: bool,
    /// Set when the program could not be started or its pipes failed
    pub launch_error: Option<String>,
}

pub struct ProcessEngine {
    timeout: Option<Duration>,
}

impl ProcessEngine {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run one fixture. Never fails: launch problems are reported in the returned value.
    #[tracing::instrument(skip(self, launch, fixture), fields(fixture = fixture.index))]
    pub async fn run_case(&self, launch: &LaunchCommand, fixture: &Fixture) -> CaseExecution {
        debug!(command = %launch, input_bytes = fixture.input.len(), "Running fixture");

        let start = Instant::now();
        let result = self.spawn_and_collect(launch, &fixture.input).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let execution = match result {
            Ok(Some(output)) => CaseExecution {
                index: fixture.index,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
                elapsed_ms,
                timed_out: false,
                launch_error: None,
            },
            Ok(None) => {
                warn!(
                    elapsed_ms,
                    timeout_ms = ?self.timeout.map(|t| t.as_millis() as u64),
                    "Fixture timed out, process killed"
                );
                CaseExecution {
                    index: fixture.index,
                    elapsed_ms,
                    timed_out: true,
                    ..Default::default()
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to execute fixture");
                CaseExecution {
                    index: fixture.index,
                    elapsed_ms,
                    launch_error: Some(format!("{:#}", e)),
                    ..Default::default()
                }
            }
        };

        if !execution.stderr.is_empty() {
            debug!(
                stderr = execution.stderr.lines().next().unwrap_or(""),
                "Program wrote to stderr"
            );
        }
        debug!(
            exit_code = ?execution.exit_code,
            elapsed_ms = execution.elapsed_ms,
            stdout_bytes = execution.stdout.len(),
            "Fixture process finished"
        );

        execution
    }

    /// `Ok(None)` means the deadline passed and the child was killed
    async fn spawn_and_collect(&self, launch: &LaunchCommand, input: &str) -> Result<Option<Output>> {
        let mut child = Command::new(&launch.program)
            .args(&launch.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to launch `{}`", launch))?;

        let mut stdin = child.stdin.take().context("Child stdin was not captured")?;
        let input = input.to_owned();

        // Fed from its own task so a program that prints before reading cannot deadlock us
        let writer = tokio::spawn(async move {
            let written = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            written
        });

        let wait = child.wait_with_output();
        let collected = match self.timeout {
            // Dropping the wait future drops the child, and kill_on_drop kills it
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(collected) => collected,
                Err(_) => {
                    // A surviving grandchild can hold stdin open without reading it
                    writer.abort();
                    return Ok(None);
                }
            },
            None => wait.await,
        };

        let output = match collected {
            Ok(output) => output,
            Err(e) => {
                writer.abort();
                return Err(e).context("Failed to collect process output");
            }
        };

        // Child has exited; unread input is dropped
        if !writer.is_finished() {
            writer.abort();
        }

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("Program exited before reading all of its input");
            }
            Ok(Err(e)) => warn!(error = %e, "Failed to write fixture input"),
            Err(e) if e.is_cancelled() => {
                debug!("Program exited before reading all of its input");
            }
            Err(e) => warn!(error = %e, "Input writer task failed"),
        }

        Ok(Some(output))
    }
}
