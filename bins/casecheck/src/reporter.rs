//! Result reporting: a pure projection of a RunSummary onto presentation events
//!
//! The host owns its presentation surfaces (notification area, status
//! indicator, detail log) and builds them once; each run only sends events.

use std::io::Write;

use anyhow::Result;
use casecheck_common::types::{CaseStatus, RunSummary};

pub const ALL_PASSED_MESSAGE: &str = "All test cases passed! 🎉";
pub const SOME_FAILED_MESSAGE: &str = "Some test cases failed. Please check your code. ❌";
pub const STATUS_PASSED: &str = "✔ All tests passed!";
pub const STATUS_FAILED: &str = "✘ Some tests failed.";
const RESULTS_HEADER: &str = "========== Test Results ==========";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    Notification {
        level: NotificationLevel,
        message: String,
    },
    Status {
        text: String,
        tooltip: String,
    },
    Detail {
        lines: Vec<String>,
    },
}

/// Host-side presentation surfaces
pub trait Presenter {
    fn notify(&mut self, level: NotificationLevel, message: &str) -> Result<()>;
    fn set_status(&mut self, text: &str, tooltip: &str) -> Result<()>;
    fn show_detail(&mut self, lines: &[String]) -> Result<()>;

    fn present(&mut self, event: &PresentationEvent) -> Result<()> {
        match event {
            PresentationEvent::Notification { level, message } => self.notify(*level, message),
            PresentationEvent::Status { text, tooltip } => self.set_status(text, tooltip),
            PresentationEvent::Detail { lines } => self.show_detail(lines),
        }
    }
}

/// Exactly one detail log, one notification and one status update per run
pub fn report(summary: &RunSummary) -> Vec<PresentationEvent> {
    let (level, message, status) = if summary.passed {
        (NotificationLevel::Info, ALL_PASSED_MESSAGE, STATUS_PASSED)
    } else {
        (NotificationLevel::Error, SOME_FAILED_MESSAGE, STATUS_FAILED)
    };

    vec![
        PresentationEvent::Detail {
            lines: detail_lines(summary),
        },
        PresentationEvent::Notification {
            level,
            message: message.to_string(),
        },
        PresentationEvent::Status {
            text: status.to_string(),
            tooltip: format!(
                "{}: {}/{} passed",
                summary.meta.problem,
                summary.passed_count(),
                summary.results.len()
            ),
        },
    ]
}

/// Per-fixture breakdown in fixture order
pub fn detail_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![RESULTS_HEADER.to_string()];

    if let Some(failure) = &summary.build_failure {
        lines.push(format!("Build: ❌ {}", failure));
        lines.extend(failure.diagnostics.lines().map(|l| l.to_string()));
        return lines;
    }

    for (result, output) in summary.results.iter().zip(&summary.outputs) {
        match result.status {
            CaseStatus::Passed => {
                lines.push(format!("Test Case {}: ✅ Passed", result.index));
            }
            CaseStatus::WrongAnswer => {
                lines.push(format!("Test Case {}: ❌ Failed", result.index));
                lines.push(format!("Expected: {}", output.expected_output));
                lines.push(format!(" Actual : {}", output.actual_output));
            }
            CaseStatus::RunError => {
                lines.push(format!("Test Case {}: ❌ Run Error", result.index));
                if let Some(first) = output.stderr.lines().find(|l| !l.trim().is_empty()) {
                    lines.push(format!(" stderr : {}", first));
                }
            }
            CaseStatus::TimedOut => {
                lines.push(format!(
                    "Test Case {}: ⏱ Timed Out after {}ms",
                    result.index, result.elapsed_ms
                ));
            }
        }
    }

    for gap in &summary.skipped {
        lines.push(format!(
            "Test Case {}: ⚠ Skipped ({} not found)",
            gap.index, gap.missing_output_file
        ));
    }

    lines
}

/// Send every event for this summary to the presenter
pub fn deliver(presenter: &mut dyn Presenter, summary: &RunSummary) -> Result<()> {
    for event in report(summary) {
        presenter.present(&event)?;
    }
    Ok(())
}

/// Terminal presenter used by the CLI host
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn notify(&mut self, _level: NotificationLevel, message: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn set_status(&mut self, text: &str, tooltip: &str) -> Result<()> {
        writeln!(self.out, "{} ({})", text, tooltip)?;
        Ok(())
    }

    fn show_detail(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}
