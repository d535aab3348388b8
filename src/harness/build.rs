//! External clean and build step run before the tests

use std::process::Stdio;

use tokio::process::Command;

use crate::common::config::BuildConfig;
use crate::common::{Error, Result};

/// Run the build step
///
/// The clean command only runs before a full milestone selection so that an
/// explicit subset reuses existing build artifacts. A command that exits
/// unsuccessfully is logged and the run carries on.
pub async fn run(config: &BuildConfig, full_selection: bool) -> Result<()> {
    if full_selection {
        run_step("clean", &config.clean).await?;
    }
    run_step("build", &config.build).await
}

async fn run_step(name: &'static str, argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        tracing::debug!(step = name, "No command configured, skipping");
        return Ok(());
    };

    tracing::debug!(step = name, command = %argv.join(" "), "Running build step");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::spawn(name, program, e))?;

    if !status.success() {
        tracing::warn!(
            step = name,
            command = %argv.join(" "),
            exit_code = status.code(),
            "Build step failed"
        );
    }

    Ok(())
}
