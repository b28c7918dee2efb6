//! Fixture discovery: pairs `ip<N>.txt` with `op<N>.txt` inside a problem directory

use std::path::Path;
use std::sync::LazyLock;

use casecheck_common::config::FixtureLayout;
use casecheck_common::types::{Fixture, FixtureGap};
use casecheck_common::HarnessError;
use regex::Regex;
use tokio::fs;
use tracing::{debug, warn};

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Fixtures ready to run, sorted by index, plus inputs that had no expected output
#[derive(Debug, Default)]
pub struct FixtureSet {
    pub fixtures: Vec<Fixture>,
    pub gaps: Vec<FixtureGap>,
}

impl FixtureSet {
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

/// First maximal digit run in a file name, as written and as a number
fn index_token(file_name: &str) -> Option<(&str, u32)> {
    let token = DIGIT_RUN.find(file_name)?.as_str();
    let index = token.parse().ok()?;
    Some((token, index))
}

/// Invalid UTF-8 becomes U+FFFD instead of failing the run
async fn read_lossy(path: &Path) -> Result<String, HarnessError> {
    let bytes = fs::read(path).await.map_err(|e| HarnessError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scan `dir` for input fixtures and load each one that has a matching output file
pub async fn discover(dir: &Path, layout: &FixtureLayout) -> Result<FixtureSet, HarnessError> {
    if !fs::try_exists(dir).await.unwrap_or(false) {
        return Err(HarnessError::FixtureDirMissing(dir.to_path_buf()));
    }

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| HarnessError::io(dir, e))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| HarnessError::io(dir, e))?
    {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !layout.is_input_file(&file_name) {
            continue;
        }

        match index_token(&file_name) {
            Some((token, index)) => {
                let output_file = layout.output_file_name(token);
                candidates.push((index, file_name, output_file));
            }
            None => debug!(file = %file_name, "Input file has no numeric index, ignoring"),
        }
    }

    // Directory listing order is arbitrary
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut set = FixtureSet::default();
    for (index, input_file, output_file) in candidates {
        let input_path = dir.join(&input_file);
        let output_path = dir.join(&output_file);

        if !fs::try_exists(&output_path).await.unwrap_or(false) {
            warn!(
                fixture = index,
                input = %input_file,
                "Expected output file {} not found, skipping",
                output_file
            );
            set.gaps.push(FixtureGap {
                index,
                input_file,
                missing_output_file: output_file,
            });
            continue;
        }

        let input = read_lossy(&input_path).await?;
        let expected_output = read_lossy(&output_path).await?;

        set.fixtures.push(Fixture {
            index,
            input_path,
            output_path,
            input,
            expected_output,
        });
    }

    debug!(
        dir = %dir.display(),
        fixtures = set.fixtures.len(),
        gaps = set.gaps.len(),
        "Fixture discovery complete"
    );

    Ok(set)
}
