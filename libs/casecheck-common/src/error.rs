use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run before any fixture process is spawned
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("problem name is required")]
    EmptyProblemName,

    #[error("solution code is empty: {0}")]
    EmptySolution(PathBuf),

    #[error("'TestData' folder not found")]
    TestDataMissing,

    #[error("the folder '{problem}' does not exist inside '{}'", .test_data.display())]
    ProblemDirMissing { problem: String, test_data: PathBuf },

    #[error("fixture directory not found: {}", .0.display())]
    FixtureDirMissing(PathBuf),

    #[error("unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("language '{0}' is compiled but has no compile command")]
    MissingCompileCommand(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}
