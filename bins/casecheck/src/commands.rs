// CLI commands: the host side of a run
use anyhow::{Context, Result};
use casecheck_common::config::HarnessConfig;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::LanguageConfigManager;
use crate::executor::{self, RunRequest};
use crate::fixtures;
use crate::reporter::{self, ConsolePresenter};
use crate::workspace;

pub struct RunArgs {
    pub problem: String,
    pub solution: PathBuf,
    pub workspaces: Vec<PathBuf>,
    pub language: Option<String>,
    pub timeout_ms: Option<u64>,
    pub jobs: Option<usize>,
    pub languages: Option<PathBuf>,
    pub json: bool,
}

/// Explicit path, then CASECHECK_LANGUAGES, then config/languages.json, then the built-in table
fn load_languages(path: Option<&Path>) -> Result<LanguageConfigManager> {
    match path {
        Some(path) => LanguageConfigManager::load(path),
        None => LanguageConfigManager::load_default(),
    }
}

fn workspace_roots(workspaces: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if workspaces.is_empty() {
        Ok(vec![std::env::current_dir().context("No folder or workspace is open")?])
    } else {
        Ok(workspaces)
    }
}

/// Resolve everything, run, present. Returns the overall verdict.
pub async fn run(args: RunArgs) -> Result<bool> {
    let mut config = HarnessConfig::from_env();
    if let Some(ms) = args.timeout_ms {
        config.timeout_ms = ms;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs.max(1);
    }
    if args.languages.is_some() {
        config.languages_path = args.languages;
    }

    let languages = load_languages(config.languages_path.as_deref())?;

    workspace::ensure_solution(&args.solution)?;
    let language = match &args.language {
        Some(tag) => languages.get_config(tag)?,
        None => languages.detect(&args.solution)?,
    };

    let roots = workspace_roots(args.workspaces)?;
    let fixture_dir = workspace::resolve_fixture_dir(&roots, &args.problem)?;

    let request = RunRequest {
        problem: workspace::normalize_problem_name(&args.problem),
        solution: args.solution,
        language: language.name.clone(),
        fixture_dir,
    };

    let summary = executor::execute_run(&request, &languages, &config).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?
        );
    } else {
        let mut presenter = ConsolePresenter::new(io::stdout().lock());
        reporter::deliver(&mut presenter, &summary)?;
    }

    Ok(summary.passed)
}

/// Print the fixtures and gaps for a problem without running anything
pub async fn list_fixtures(problem: &str, workspaces: Vec<PathBuf>) -> Result<()> {
    let roots = workspace_roots(workspaces)?;
    let fixture_dir = workspace::resolve_fixture_dir(&roots, problem)?;
    let config = HarnessConfig::from_env();
    let set = fixtures::discover(&fixture_dir, &config.layout).await?;

    println!("📂 {}", fixture_dir.display());

    if set.fixtures.is_empty() && set.gaps.is_empty() {
        println!("No test cases found.");
        return Ok(());
    }

    println!("{:<8} {:<16} {:<16} {:>10}", "Case", "Input", "Output", "Bytes in");
    println!("{}", "─".repeat(53));

    for fixture in &set.fixtures {
        println!(
            "{:<8} {:<16} {:<16} {:>10}",
            fixture.index,
            file_name(&fixture.input_path),
            file_name(&fixture.output_path),
            fixture.input.len()
        );
    }
    for gap in &set.gaps {
        println!(
            "{:<8} {:<16} {:<16} {:>10}",
            gap.index, gap.input_file, "⚠ missing", "-"
        );
    }

    println!(
        "\n✅ {} runnable, {} skipped",
        set.fixtures.len(),
        set.gaps.len()
    );

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List all configured languages
pub fn list_languages(path: Option<&Path>) -> Result<()> {
    let config = HarnessConfig::from_env();
    let languages = load_languages(path.or(config.languages_path.as_deref()))?;

    println!("📋 Configured Languages:\n");
    println!("{:<12} {:<12} {:<16} {:<40}", "Name", "Kind", "Extensions", "Run");
    println!("{}", "─".repeat(80));

    for lang in languages.languages() {
        println!(
            "{:<12} {:<12} {:<16} {:<40}",
            lang.name,
            format!("{:?}", lang.kind).to_lowercase(),
            lang.extensions.join(","),
            format!("{} {}", lang.run.command, lang.run.args.join(" ")).trim_end()
        );
    }

    println!("\n✅ Total: {} language(s)", languages.languages().len());

    Ok(())
}
