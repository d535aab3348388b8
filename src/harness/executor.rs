//! Client execution for one test case
//!
//! The client reads the test script on stdin and its stdout is written to
//! the case's output file, replacing whatever was there.

use std::fs::File;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::common::config::ClientConfig;
use crate::common::{Error, Result};

use super::corpus::TestCase;
use super::process::resolve_program;

/// Outcome of running the client once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Wall-clock time from spawn to exit, truncated to whole microseconds
    pub elapsed_us: u64,
    /// Exit code, `None` when killed by a signal or by the timeout
    pub exit_code: Option<i32>,
    /// Killed after exceeding the configured timeout
    pub timed_out: bool,
}

impl Execution {
    pub fn exited_cleanly(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs the client binary against test scripts
#[derive(Debug, Clone)]
pub struct ClientRunner {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ClientRunner {
    pub fn new(program: PathBuf, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(
            resolve_program(&config.command)?,
            config.args.clone(),
            config.timeout(),
        ))
    }

    /// Run the client for one test case and wait for it to exit
    ///
    /// Without a timeout a client that never exits blocks here forever.
    pub async fn run(&self, case: &TestCase) -> Result<Execution> {
        let input =
            File::open(&case.paths.input).map_err(|e| Error::file_read(&case.paths.input, e))?;
        let output = File::create(&case.paths.actual)
            .map_err(|e| Error::file_write(&case.paths.actual, e))?;

        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::spawn("client", &self.program.display().to_string(), e))?;

        let wait_err = |source: std::io::Error| Error::ProcessWait {
            role: "client",
            source,
        };

        let (status, timed_out) = match self.timeout {
            None => (Some(child.wait().await.map_err(wait_err)?), false),
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => (Some(status.map_err(wait_err)?), false),
                Err(_) => {
                    tracing::warn!(
                        test = %case.label(),
                        timeout_secs = limit.as_secs(),
                        "Client timed out, killing it"
                    );
                    // The client may have exited between the timeout and the kill
                    if let Err(e) = child.kill().await {
                        tracing::debug!(error = %e, "Failed to kill timed out client");
                    }
                    (None, true)
                }
            },
        };

        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        let exit_code = status.and_then(|s| s.code());

        if !timed_out && exit_code != Some(0) {
            tracing::warn!(
                test = %case.label(),
                exit_code = exit_code,
                "Client exited unsuccessfully"
            );
        }

        tracing::debug!(test = %case.label(), elapsed_us, "Client finished");

        Ok(Execution {
            elapsed_us,
            exit_code,
            timed_out,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::harness::corpus::TestPaths;
    use std::path::Path;

    fn case_in(root: &Path, id: u32, script: &str) -> TestCase {
        let paths = TestPaths::new(root, id);
        std::fs::write(&paths.input, script).unwrap();
        TestCase {
            id,
            paths,
            contains_shutdown: false,
        }
    }

    fn shell(script: &str, timeout: Option<Duration>) -> ClientRunner {
        ClientRunner::new(
            PathBuf::from("/bin/sh"),
            vec!["-c".to_string(), script.to_string()],
            timeout,
        )
    }

    #[tokio::test]
    async fn test_stdin_piped_to_actual_output() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path(), 4, "select(a)\nfetch(b)\n");

        let execution = shell("cat", None).run(&case).await.unwrap();

        assert!(execution.exited_cleanly());
        assert_eq!(
            std::fs::read_to_string(&case.paths.actual).unwrap(),
            "select(a)\nfetch(b)\n"
        );
    }

    #[tokio::test]
    async fn test_actual_output_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path(), 5, "new\n");
        std::fs::write(&case.paths.actual, "stale output from last run\n").unwrap();

        shell("cat", None).run(&case).await.unwrap();

        assert_eq!(std::fs::read_to_string(&case.paths.actual).unwrap(), "new\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path(), 6, "");

        let execution = shell("exit 3", None).run(&case).await.unwrap();

        assert_eq!(execution.exit_code, Some(3));
        assert!(!execution.timed_out);
        assert!(!execution.exited_cleanly());
    }

    #[tokio::test]
    async fn test_elapsed_covers_client_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path(), 7, "");

        let execution = shell("sleep 0.2", None).run(&case).await.unwrap();

        assert!(execution.elapsed_us >= 200_000);
    }

    #[tokio::test]
    async fn test_timeout_kills_client() {
        let dir = tempfile::tempdir().unwrap();
        let case = case_in(dir.path(), 8, "");

        let execution = shell("sleep 30", Some(Duration::from_millis(200)))
            .run(&case)
            .await
            .unwrap();

        assert!(execution.timed_out);
        assert_eq!(execution.exit_code, None);
        assert!(execution.elapsed_us < 30_000_000);
    }

    #[tokio::test]
    async fn test_missing_script_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let case = TestCase {
            id: 9,
            paths: TestPaths::new(dir.path(), 9),
            contains_shutdown: false,
        };

        let err = shell("cat", None).run(&case).await.unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
