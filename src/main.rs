//! depvet - npm manifest dependency checker CLI
//!
//! Reads one or more package.json files, checks their declared dependencies
//! against an npm-compatible registry, reports outdated entries, and
//! optionally rewrites the manifests with fresh version ranges.

use clap::Parser;
use depvet::artifact::Artifact;
use depvet::checker::Checker;
use depvet::cli::CliArgs;
use depvet::pipeline::{Pipeline, PipelineResult};
use depvet::progress::Progress;
use depvet::reporter::{ConsoleReporter, JsonReporter, Reporter};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let reporter: Option<Box<dyn Reporter>> = if args.quiet {
        None
    } else if args.json {
        Some(Box::new(JsonReporter::new()))
    } else {
        Some(Box::new(ConsoleReporter::new(!args.no_color)))
    };

    let mut checker = Checker::new()?
        .with_registry(args.registry.clone())
        .with_ignore(args.ignore.clone())
        .with_unstable(args.unstable)
        .with_update(args.update_operator())
        .with_verbose(args.verbose)
        .with_reporter(reporter);
    checker.error = args.error_condition();

    let mut artifacts = Vec::new();
    let mut read_failures = 0usize;
    for path in &args.paths {
        match Artifact::read(path) {
            Ok(artifact) => artifacts.push(artifact),
            Err(err) => {
                eprintln!("{}", err);
                read_failures += 1;
            }
        }
    }

    let mut progress = Progress::new(!args.quiet && !args.json);
    progress.spinner("Checking dependencies...");
    let result = Pipeline::new(checker).run(artifacts).await;
    progress.finish_and_clear();

    if args.writes_back() {
        write_back(&result)?;
    }

    for failure in &result.failures {
        eprintln!("{}", failure);
    }

    if result.threshold_exceeded() {
        Ok(ExitCode::from(1))
    } else if !result.failures.is_empty() || read_failures > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Write rewritten payloads back to their manifest paths
fn write_back(result: &PipelineResult) -> anyhow::Result<()> {
    use depvet::error::ManifestError;

    for artifact in &result.processed {
        if let Some(bytes) = artifact.bytes() {
            std::fs::write(&artifact.path, bytes)
                .map_err(|source| ManifestError::write(&artifact.path, source))?;
        }
    }
    Ok(())
}
