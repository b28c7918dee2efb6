mod build;
mod commands;
mod config;
mod engine;
mod evaluator;
mod executor;
mod fixtures;
mod reporter;
mod workspace;


use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "casecheck")]
#[command(about = "Run a solution against the sample test cases in TestData", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile (if needed) and run a solution against every fixture
    Run {
        /// Problem name (e.g. "Two Sum"), normalized to the TestData folder name
        #[arg(short, long)]
        problem: String,

        /// Solution source file
        #[arg(short, long)]
        solution: PathBuf,

        /// Workspace folder(s) to search for TestData (defaults to the current directory)
        #[arg(short, long)]
        workspace: Vec<PathBuf>,

        /// Language tag; detected from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// Per-fixture time limit in milliseconds (0 disables)
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Maximum number of fixtures running at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Path to a languages.json file
        #[arg(long)]
        languages: Option<PathBuf>,

        /// Print the run summary as JSON instead of the text report
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show the fixtures that would run for a problem
    List {
        /// Problem name
        #[arg(short, long)]
        problem: String,

        /// Workspace folder(s) to search for TestData
        #[arg(short, long)]
        workspace: Vec<PathBuf>,
    },

    /// List configured languages
    Languages {
        /// Path to a languages.json file
        #[arg(long)]
        languages: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Run {
            problem,
            solution,
            workspace,
            language,
            timeout_ms,
            jobs,
            languages,
            json,
        } => {
            let passed = commands::run(commands::RunArgs {
                problem,
                solution,
                workspaces: workspace,
                language,
                timeout_ms,
                jobs,
                languages,
                json,
            })
            .await?;

            Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::List { problem, workspace } => {
            commands::list_fixtures(&problem, workspace).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Languages { languages } => {
            commands::list_languages(languages.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "casecheck", "run", "-p", "Two Sum", "-s", "main.cpp", "-w", "/a", "-w", "/b", "--jobs", "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                problem,
                solution,
                workspace,
                jobs,
                json,
                language,
                ..
            } => {
                assert_eq!(problem, "Two Sum");
                assert_eq!(solution, PathBuf::from("main.cpp"));
                assert_eq!(workspace, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
                assert_eq!(jobs, Some(2));
                assert!(!json);
                assert!(language.is_none());
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_logging_flags() {
        let cli = Cli::try_parse_from(["casecheck", "languages", "--log-json", "-v"]).unwrap();
        assert!(cli.log_json);
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["casecheck", "languages"]).unwrap();
        assert!(!cli.log_json);
    }

    #[test]
    fn test_run_requires_problem() {
        assert!(Cli::try_parse_from(["casecheck", "run", "-s", "main.cpp"]).is_err());
    }
}
