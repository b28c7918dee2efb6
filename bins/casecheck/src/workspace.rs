// Host-side resolution: workspace roots → TestData/<problem>/ and solution sanity checks
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use casecheck_common::HarnessError;
use regex::Regex;
use tracing::debug;

pub const TEST_DATA_DIR: &str = "TestData";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// "Two Sum" → "two-sum"
pub fn normalize_problem_name(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}

/// First workspace root that has a TestData folder decides where the fixtures are
pub fn resolve_fixture_dir(workspaces: &[PathBuf], problem: &str) -> Result<PathBuf, HarnessError> {
    if problem.trim().is_empty() {
        return Err(HarnessError::EmptyProblemName);
    }
    let problem = normalize_problem_name(problem);

    for root in workspaces {
        let test_data = root.join(TEST_DATA_DIR);
        if !test_data.is_dir() {
            debug!(workspace = %root.display(), "No TestData folder");
            continue;
        }

        let problem_dir = test_data.join(&problem);
        if !problem_dir.is_dir() {
            return Err(HarnessError::ProblemDirMissing { problem, test_data });
        }

        debug!(dir = %problem_dir.display(), "Found fixture directory");
        return Ok(problem_dir);
    }

    Err(HarnessError::TestDataMissing)
}

/// Reject a solution file that is missing or has nothing but whitespace
pub fn ensure_solution(path: &Path) -> Result<(), HarnessError> {
    let code = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    if code.trim().is_empty() {
        return Err(HarnessError::EmptySolution(path.to_path_buf()));
    }
    Ok(())
}
