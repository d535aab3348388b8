//! Milestone test harness
//!
//! Builds the project, then runs the numbered client scripts of the test
//! corpus against a long-lived server, printing the time each one took.

use clap::Parser;
use milestone_harness::{cli, commands::RunArgs, common::logging};

#[derive(Parser)]
#[command(name = "run-tests", about = "Run milestone tests against the client/server")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: RunArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.args.verbose);

    let strict = cli.args.strict;
    match cli::run(cli.args).await {
        Ok(summary) if strict && summary.has_failures() => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
