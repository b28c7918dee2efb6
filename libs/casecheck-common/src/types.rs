use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// How a language turns source into something runnable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    /// Compiled once into an executable, then the executable is run per fixture
    Compiled,
    /// The source file is handed to an interpreter per fixture
    Interpreted,
}

/// One input/expected-output pair loaded from the fixture directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub index: u32,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input: String,
    pub expected_output: String,
}

/// An input fixture whose expected-output file does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureGap {
    pub index: u32,
    pub input_file: String,
    pub missing_output_file: String,
}

/// Verdict for a single fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    WrongAnswer,
    /// Diagnostic output under the strict stderr policy, or the program could not be launched
    RunError,
    TimedOut,
}

impl CaseStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseStatus::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "Passed",
            CaseStatus::WrongAnswer => "Failed",
            CaseStatus::RunError => "Run Error",
            CaseStatus::TimedOut => "Timed Out",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub index: u32,
    pub passed: bool,
    pub status: CaseStatus,
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
}

/// Trimmed expected/actual text kept for display, plus whatever the program wrote to stderr
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutput {
    pub expected_output: String,
    pub actual_output: String,
    pub stderr: String,
}

/// Compiler exited non-zero or could not be spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFailure {
    pub exit_code: Option<i32>,
    pub diagnostics: String,
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "compilation failed (exit code {})", code),
            None => write!(f, "compilation failed"),
        }
    }
}

/// Identity of a run, fixed when the run starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub problem: String,
    pub language: String,
}

impl RunMeta {
    pub fn start(problem: &str, language: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            problem: problem.to_string(),
            language: language.to_string(),
        }
    }
}

/// Complete outcome of one run. `results[i]` and `outputs[i]` describe the same fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub results: Vec<CaseResult>,
    pub outputs: Vec<CaseOutput>,
    pub skipped: Vec<FixtureGap>,
    pub build_failure: Option<BuildFailure>,
    pub passed: bool,
}

impl RunSummary {
    pub fn completed(
        meta: RunMeta,
        cases: Vec<(CaseResult, CaseOutput)>,
        skipped: Vec<FixtureGap>,
    ) -> Self {
        let passed = cases.iter().all(|(result, _)| result.passed);
        let (results, outputs) = cases.into_iter().unzip();

        Self {
            meta,
            results,
            outputs,
            skipped,
            build_failure: None,
            passed,
        }
    }

    pub fn build_failed(meta: RunMeta, failure: BuildFailure, skipped: Vec<FixtureGap>) -> Self {
        Self {
            meta,
            results: Vec::new(),
            outputs: Vec::new(),
            skipped,
            build_failure: Some(failure),
            passed: false,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(index: u32, status: CaseStatus) -> (CaseResult, CaseOutput) {
        (
            CaseResult {
                index,
                passed: status.is_passed(),
                status,
                exit_code: Some(0),
                elapsed_ms: 1,
            },
            CaseOutput {
                expected_output: "x".to_string(),
                actual_output: "x".to_string(),
                stderr: String::new(),
            },
        )
    }

    #[test]
    fn test_all_passed_is_logical_and() {
        let meta = RunMeta::start("two-sum", "cpp");
        let summary = RunSummary::completed(
            meta,
            vec![case(1, CaseStatus::Passed), case(2, CaseStatus::Passed)],
            vec![],
        );
        assert!(summary.passed);
        assert_eq!(summary.passed_count(), 2);
    }

    #[test]
    fn test_single_failure_fails_run() {
        let meta = RunMeta::start("two-sum", "cpp");
        let summary = RunSummary::completed(
            meta,
            vec![
                case(1, CaseStatus::Passed),
                case(2, CaseStatus::WrongAnswer),
                case(3, CaseStatus::Passed),
            ],
            vec![],
        );
        assert!(!summary.passed);
        assert_eq!(summary.results.len(), 3);
        assert_eq!(summary.outputs.len(), 3);
        assert_eq!(summary.results[1].index, 2);
    }

    #[test]
    fn test_build_failure_has_no_cases() {
        let meta = RunMeta::start("two-sum", "cpp");
        let summary = RunSummary::build_failed(
            meta,
            BuildFailure {
                exit_code: Some(1),
                diagnostics: "error: expected ';'".to_string(),
            },
            vec![],
        );
        assert!(!summary.passed);
        assert!(summary.results.is_empty());
        assert!(summary.outputs.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&CaseStatus::WrongAnswer).unwrap();
        assert_eq!(json, "\"wrong_answer\"");
        let kind: LanguageKind = serde_json::from_str("\"interpreted\"").unwrap();
        assert_eq!(kind, LanguageKind::Interpreted);
    }
}
