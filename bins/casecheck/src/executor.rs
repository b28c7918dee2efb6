/// Run Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Drive one run from request to immutable RunSummary.
///
/// **Architecture:**
/// 1. Discover fixtures (fixtures.rs); a missing directory aborts here
/// 2. Compiled languages: stage + compile once (build.rs); failure ends the run
/// 3. Run every fixture through ProcessEngine (engine.rs)
/// 4. Judge each execution with the Evaluator (evaluator.rs)
/// 5. Aggregate into a RunSummary in fixture index order
///
/// This module is the glue layer - it knows nothing about:
/// - How processes are spawned (engine's job)
/// - How outputs are compared (evaluator's job)

use std::path::PathBuf;

use casecheck_common::config::HarnessConfig;
use casecheck_common::types::{CaseOutput, CaseResult, Fixture, LanguageKind, RunMeta, RunSummary};
use casecheck_common::HarnessError;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::build::{self, BuildPlan};
use crate::config::LanguageConfigManager;
use crate::engine::{LaunchCommand, ProcessEngine};
use crate::evaluator::{self, StderrPolicy};
use crate::fixtures;

/// Everything the host supplies to trigger a run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub problem: String,
    pub solution: PathBuf,
    pub language: String,
    pub fixture_dir: PathBuf,
}

/// Execute a run: build once if needed, then every fixture
///
/// `config.jobs` caps how many fixture processes run at once; with the
/// default of 1 each process is spawned only after the previous one exited.
/// Results always come back in fixture index order.
#[tracing::instrument(
    skip(request, languages, config),
    fields(problem = %request.problem, language = %request.language)
)]
pub async fn execute_run(
    request: &RunRequest,
    languages: &LanguageConfigManager,
    config: &HarnessConfig,
) -> Result<RunSummary, HarnessError> {
    let language = languages.get_config(&request.language)?;

    let fixture_set = fixtures::discover(&request.fixture_dir, &config.layout).await?;
    let meta = RunMeta::start(&request.problem, &language.name);

    info!(
        run_id = %meta.run_id,
        fixtures = fixture_set.fixtures.len(),
        skipped = fixture_set.gaps.len(),
        timeout_ms = config.timeout_ms,
        jobs = config.jobs,
        "Starting run"
    );
    if fixture_set.is_empty() {
        warn!(dir = %request.fixture_dir.display(), "No runnable fixtures found");
    }

    let launch = match language.kind {
        LanguageKind::Compiled => {
            let compiler = language
                .compile
                .as_ref()
                .ok_or_else(|| HarnessError::MissingCompileCommand(language.name.clone()))?;

            let plan = BuildPlan::new(&request.fixture_dir, &request.solution);
            build::stage_source(&request.solution, &plan).await?;

            match build::compile(compiler, &plan).await {
                Ok(output) => {
                    info!(
                        elapsed_ms = output.elapsed_ms,
                        warnings = !output.diagnostics.is_empty(),
                        "Build finished"
                    );
                }
                Err(failure) => {
                    warn!(run_id = %meta.run_id, "Build failed, no fixtures will run");
                    return Ok(RunSummary::build_failed(meta, failure, fixture_set.gaps));
                }
            }

            language.run.render(&plan.staged_source, &plan.artifact)
        }
        // The source file itself is the artifact
        LanguageKind::Interpreted => language.run.render(&request.solution, &request.solution),
    };

    let engine = ProcessEngine::new(config.timeout());
    let policy = StderrPolicy::from_flag(language.stderr_is_error);
    let cases = run_fixtures(&engine, &launch, &fixture_set.fixtures, policy, config.jobs).await;

    let summary = RunSummary::completed(meta, cases, fixture_set.gaps);

    info!(
        run_id = %summary.meta.run_id,
        passed = summary.passed,
        passed_count = summary.passed_count(),
        total = summary.results.len(),
        "Run complete"
    );

    Ok(summary)
}

/// Execute and judge each fixture, keeping at most `jobs` processes alive
async fn run_fixtures(
    engine: &ProcessEngine,
    launch: &LaunchCommand,
    fixtures: &[Fixture],
    policy: StderrPolicy,
    jobs: usize,
) -> Vec<(CaseResult, CaseOutput)> {
    // `buffered` yields in input order regardless of completion order
    stream::iter(fixtures)
        .map(|fixture| async move {
            info!(fixture = fixture.index, "Running test case");
            let execution = engine.run_case(launch, fixture).await;
            evaluator::evaluate_case(&execution, fixture, policy)
        })
        .buffered(jobs.max(1))
        .collect()
        .await
}
