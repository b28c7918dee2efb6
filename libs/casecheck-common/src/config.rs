// Harness-wide settings: fixture naming, per-fixture deadline, worker cap
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_JOBS: usize = 1;

pub const ENV_TIMEOUT_MS: &str = "CASECHECK_TIMEOUT_MS";
pub const ENV_JOBS: &str = "CASECHECK_JOBS";
pub const ENV_LANGUAGES: &str = "CASECHECK_LANGUAGES";

/// File naming convention inside a problem's fixture directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLayout {
    pub input_prefix: String,
    pub output_prefix: String,
    pub suffix: String,
}

impl Default for FixtureLayout {
    fn default() -> Self {
        Self {
            input_prefix: "ip".to_string(),
            output_prefix: "op".to_string(),
            suffix: ".txt".to_string(),
        }
    }
}

impl FixtureLayout {
    pub fn is_input_file(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.input_prefix) && file_name.ends_with(&self.suffix)
    }

    pub fn output_file_name(&self, index: &str) -> String {
        format!("{}{}{}", self.output_prefix, index, self.suffix)
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Per-fixture deadline; 0 disables it
    pub timeout_ms: u64,
    /// Maximum number of fixture processes alive at once
    pub jobs: usize,
    pub layout: FixtureLayout,
    pub languages_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            jobs: DEFAULT_JOBS,
            layout: FixtureLayout::default(),
            languages_path: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by `CASECHECK_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = lookup(ENV_TIMEOUT_MS).and_then(|v| v.trim().parse().ok()) {
            config.timeout_ms = ms;
        }
        if let Some(jobs) = lookup(ENV_JOBS).and_then(|v| v.trim().parse::<usize>().ok()) {
            config.jobs = jobs.max(1);
        }
        if let Some(path) = lookup(ENV_LANGUAGES).filter(|v| !v.trim().is_empty()) {
            config.languages_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
