/// Case Evaluator - Language-Agnostic Verdict Logic
///
/// **Core Responsibility:**
/// Compare raw execution output against a fixture's expected output and
/// produce the Case Result / Case Output pair for that fixture.
///
/// **Critical Properties:**
/// - Knows nothing about process spawning
/// - Knows nothing about compilers or interpreters
/// - Pure function: (execution output, fixture, policy) → verdict
///
/// **Verdict Priority:**
/// 1. Launch failure → RunError
/// 2. Deadline exceeded → TimedOut
/// 3. stderr output under the strict policy → RunError
/// 4. Trimmed stdout == trimmed expected → Passed, else WrongAnswer
///
/// Exit status is recorded but never decides the verdict.
///
/// **Normalization Rules:**
/// - Trim leading and trailing whitespace (and a byte order mark): YES
/// - Internal whitespace: preserved
/// - Case sensitivity: YES (exact match required)

use crate::engine::CaseExecution;
use casecheck_common::types::{CaseOutput, CaseResult, CaseStatus, Fixture};
use tracing::{info, warn};

/// What stderr output means for a fixture's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrPolicy {
    /// Captured and logged, never affects the verdict
    #[default]
    Informational,
    /// Any stderr output makes that fixture a run error
    Strict,
}

impl StderrPolicy {
    pub fn from_flag(stderr_is_error: bool) -> Self {
        if stderr_is_error {
            StderrPolicy::Strict
        } else {
            StderrPolicy::Informational
        }
    }
}

/// Normalize output string for comparison
///
/// A byte order mark counts as edge whitespace, so fixtures saved by editors
/// that prepend one still match.
fn normalize_output(output: &str) -> &str {
    output.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Edge-trimmed exact comparison
pub fn outputs_match(expected: &str, actual: &str) -> bool {
    normalize_output(expected) == normalize_output(actual)
}

/// Evaluate a single fixture execution
pub fn evaluate_case(
    execution: &CaseExecution,
    fixture: &Fixture,
    policy: StderrPolicy,
) -> (CaseResult, CaseOutput) {
    debug_assert_eq!(execution.index, fixture.index);
    let expected = normalize_output(&fixture.expected_output);
    let actual = normalize_output(&execution.stdout);

    let status = if execution.launch_error.is_some() {
        CaseStatus::RunError
    } else if execution.timed_out {
        CaseStatus::TimedOut
    } else if policy == StderrPolicy::Strict && !execution.stderr.is_empty() {
        CaseStatus::RunError
    } else if outputs_match(&fixture.expected_output, &execution.stdout) {
        CaseStatus::Passed
    } else {
        CaseStatus::WrongAnswer
    };

    match status {
        CaseStatus::Passed => info!(fixture = fixture.index, "Test case passed"),
        CaseStatus::WrongAnswer => warn!(
            fixture = fixture.index,
            expected = expected,
            actual = actual,
            "Test case failed"
        ),
        CaseStatus::RunError => warn!(
            fixture = fixture.index,
            stderr = execution.stderr.lines().next().unwrap_or(""),
            launch_error = execution.launch_error.as_deref().unwrap_or(""),
            "Test case encountered an error"
        ),
        CaseStatus::TimedOut => warn!(
            fixture = fixture.index,
            elapsed_ms = execution.elapsed_ms,
            "Test case timed out"
        ),
    }

    let stderr = match &execution.launch_error {
        Some(err) if execution.stderr.is_empty() => err.clone(),
        Some(err) => format!("{}\n{}", execution.stderr, err),
        None => execution.stderr.clone(),
    };

    let result = CaseResult {
        index: fixture.index,
        passed: status.is_passed(),
        status,
        exit_code: execution.exit_code,
        elapsed_ms: execution.elapsed_ms,
    };
    let output = CaseOutput {
        expected_output: expected.to_string(),
        actual_output: actual.to_string(),
        stderr,
    };

    (result, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create a fixture
    fn make_fixture(index: u32, expected_output: &str) -> Fixture {
        Fixture {
            index,
            input_path: format!("ip{}.txt", index).into(),
            output_path: format!("op{}.txt", index).into(),
            input: "input".to_string(),
            expected_output: expected_output.to_string(),
        }
    }

    /// Helper to create a clean execution
    fn make_execution(index: u32, stdout: &str) -> CaseExecution {
        CaseExecution {
            index,
            stdout: stdout.to_string(),
            exit_code: Some(0),
            elapsed_ms: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("hello"), "hello");
        assert_eq!(normalize_output("  hello  "), "hello");
        assert_eq!(normalize_output("\nhello\r\n"), "hello");
        assert_eq!(normalize_output(""), "");
        assert_eq!(normalize_output(" \t\n"), "");
    }

    #[test]
    fn test_byte_order_mark_is_trimmed() {
        assert_eq!(normalize_output("\u{FEFF}6\r\n"), "6");
        assert!(outputs_match("\u{FEFF}6\r\n", "6"));

        let (result, output) =
            evaluate_case(&make_execution(1, "6\n"), &make_fixture(1, "\u{FEFF}6\r\n"), StderrPolicy::default());
        assert!(result.passed);
        assert_eq!(output.expected_output, "6");
    }

    #[test]
    fn test_trimming_is_symmetric() {
        assert!(outputs_match("42\n", "42"));
        assert!(outputs_match("42", "42 "));
        assert!(!outputs_match("42", "4 2"));
    }

    #[test]
    fn test_comparison_is_idempotent() {
        let pairs = [("6", "6\n"), ("10", "11"), ("", "  ")];
        for (expected, actual) in pairs {
            assert_eq!(outputs_match(expected, actual), outputs_match(expected, actual));
        }
    }

    #[test]
    fn test_exact_match() {
        let (result, output) =
            evaluate_case(&make_execution(1, "6\n"), &make_fixture(1, "6"), StderrPolicy::default());

        assert!(result.passed);
        assert_eq!(result.status, CaseStatus::Passed);
        assert_eq!(result.index, 1);
        assert_eq!(result.elapsed_ms, 3);
        assert_eq!(output.actual_output, "6");
    }

    #[test]
    fn test_mismatch_retains_both_sides() {
        let (result, output) =
            evaluate_case(&make_execution(2, "10\n"), &make_fixture(2, "11"), StderrPolicy::default());

        assert!(!result.passed);
        assert_eq!(result.status, CaseStatus::WrongAnswer);
        assert_eq!(output.expected_output, "11");
        assert_eq!(output.actual_output, "10");
    }

    #[test]
    fn test_empty_expected_only_matches_empty() {
        let fixture = make_fixture(1, "");
        let (blank, _) = evaluate_case(&make_execution(1, "  \n"), &fixture, StderrPolicy::default());
        let (text, _) = evaluate_case(&make_execution(1, "0"), &fixture, StderrPolicy::default());

        assert!(blank.passed);
        assert!(!text.passed);
    }

    #[test]
    fn test_case_sensitivity() {
        let (result, _) =
            evaluate_case(&make_execution(1, "hello"), &make_fixture(1, "Hello"), StderrPolicy::default());
        assert_eq!(result.status, CaseStatus::WrongAnswer);
    }

    #[test]
    fn test_nonzero_exit_with_matching_output_passes() {
        let mut execution = make_execution(1, "42");
        execution.exit_code = Some(3);

        let (result, _) = evaluate_case(&execution, &make_fixture(1, "42"), StderrPolicy::default());
        assert!(result.passed);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn test_stderr_is_informational_by_default() {
        let mut execution = make_execution(1, "42");
        execution.stderr = "debug: n=42\n".to_string();

        let (result, output) = evaluate_case(&execution, &make_fixture(1, "42"), StderrPolicy::Informational);
        assert!(result.passed);
        assert_eq!(output.stderr, "debug: n=42\n");
    }

    #[test]
    fn test_stderr_under_strict_policy_is_run_error() {
        let mut execution = make_execution(1, "42");
        execution.stderr = "Traceback (most recent call last):".to_string();

        let (result, _) = evaluate_case(&execution, &make_fixture(1, "42"), StderrPolicy::Strict);
        assert!(!result.passed);
        assert_eq!(result.status, CaseStatus::RunError);
    }

    #[test]
    fn test_timeout() {
        let execution = CaseExecution {
            index: 1,
            elapsed_ms: 1001,
            timed_out: true,
            ..Default::default()
        };

        let (result, output) = evaluate_case(&execution, &make_fixture(1, "output"), StderrPolicy::default());
        assert_eq!(result.status, CaseStatus::TimedOut);
        assert!(!result.passed);
        assert_eq!(output.actual_output, "");
    }

    #[test]
    fn test_launch_error() {
        let execution = CaseExecution {
            index: 1,
            launch_error: Some("Failed to launch `python3 sol.py`".to_string()),
            ..Default::default()
        };

        let (result, output) = evaluate_case(&execution, &make_fixture(1, "output"), StderrPolicy::default());
        assert_eq!(result.status, CaseStatus::RunError);
        assert_eq!(output.stderr, "Failed to launch `python3 sol.py`");
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(StderrPolicy::from_flag(true), StderrPolicy::Strict);
        assert_eq!(StderrPolicy::from_flag(false), StderrPolicy::Informational);
    }
}
