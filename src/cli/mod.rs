//! CLI command handling
//!
//! Wires configuration, test selection, the build step and the orchestrator
//! together for a single harness invocation.

use colored::Colorize;

use crate::commands::RunArgs;
use crate::common::{Config, Result};
use crate::harness::{
    self, build, report, ClientRunner, Orchestrator, ProcessLauncher, RunOptions, ServerSession,
    Summary,
};

/// Run the harness with parsed arguments
pub async fn run(args: RunArgs) -> Result<Summary> {
    let config = Config::load(args.config.clone())?;

    let selection = harness::select(&args.test_nums, args.milestone);
    for warning in &selection.warnings {
        println!("{} {}", "Warning:".yellow(), warning);
    }

    tracing::debug!(
        tests = ?selection.ids,
        full_milestone = selection.full_milestone,
        large = args.large,
        "Resolved test selection"
    );

    if args.no_build {
        tracing::debug!("Build step skipped");
    } else {
        build::run(&config.build, selection.full_milestone).await?;
    }

    // Resolved after the build, which may produce the binaries
    let launcher = ProcessLauncher::from_config(&config.server)?;
    let client = ClientRunner::from_config(&config.client)?;

    let options = RunOptions {
        root: config.corpus.root(args.large).to_path_buf(),
        verify: args.large,
        shutdown_marker: config.corpus.shutdown_marker.clone(),
        fail_on_nonzero_exit: config.client.fail_on_nonzero_exit,
    };

    let mut orchestrator = Orchestrator::new(
        ServerSession::new(launcher, config.server.settle_delay()),
        client,
        options,
        std::io::stdout(),
    );
    let results = orchestrator.run(&selection.ids).await?;
    orchestrator.into_output();

    let summary = Summary::from_results(&results);
    if args.large && !results.is_empty() {
        summary.print();
    }

    if let Some(path) = &args.report {
        report::write_json(path, &results)?;
    }

    Ok(summary)
}
