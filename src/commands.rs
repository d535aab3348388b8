//! CLI argument definitions

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Comma-separated test numbers to run, in order (overrides --milestone)
    #[arg(
        long = "test_nums",
        alias = "test-nums",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    pub test_nums: Vec<i64>,

    /// Run every test up to this milestone (1-5, default 5)
    #[arg(long, allow_negative_numbers = true)]
    pub milestone: Option<i64>,

    /// Use the large dataset corpus and verify output exactly
    #[arg(long)]
    pub large: bool,

    /// Harness config file (default: ./harness.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the clean and build step
    #[arg(long)]
    pub no_build: bool,

    /// Write per-test results as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit non-zero if any test failed or timed out
    #[arg(long)]
    pub strict: bool,

    /// Debug logging on stderr
    #[arg(long, short)]
    pub verbose: bool,
}
