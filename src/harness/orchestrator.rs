//! Sequential test orchestration
//!
//! For each selected test: make sure a server is up, run the client, check
//! the output when asked to, print one progress line, and note whether the
//! script shut the server down.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::common::Result;

use super::corpus::TestCase;
use super::executor::ClientRunner;
use super::server::{ServerLauncher, ServerSession};
use super::verifier::outputs_match;

/// Settings for one orchestrated run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Corpus root the test files live under
    pub root: PathBuf,
    /// Compare actual output to expected output
    pub verify: bool,
    /// Marker identifying a shutdown directive in a script
    pub shutdown_marker: String,
    /// Count a non-zero client exit as a failure when verifying
    pub fail_on_nonzero_exit: bool,
}

/// Result of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub id: u32,
    pub label: String,
    pub elapsed_us: u64,
    /// Pass/fail, only when verification was requested
    pub passed: Option<bool>,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub contains_shutdown: bool,
}

impl RunResult {
    /// Suffix appended to the timing on the progress line
    fn suffix(&self) -> &'static str {
        if self.timed_out {
            " (TIMEOUT)"
        } else if self.passed == Some(false) {
            " (FAIL)"
        } else {
            ""
        }
    }
}

/// Drives test cases against a single server session
pub struct Orchestrator<L, W> {
    session: ServerSession<L>,
    client: ClientRunner,
    options: RunOptions,
    out: W,
}

impl<L: ServerLauncher, W: Write> Orchestrator<L, W> {
    pub fn new(session: ServerSession<L>, client: ClientRunner, options: RunOptions, out: W) -> Self {
        Self {
            session,
            client,
            options,
            out,
        }
    }

    pub fn session(&self) -> &ServerSession<L> {
        &self.session
    }

    /// Consume the orchestrator, returning its output sink
    pub fn into_output(self) -> W {
        self.session.finish();
        self.out
    }

    /// Run the given tests in order
    ///
    /// A failed comparison does not stop the run. Errors (missing files,
    /// spawn failures) do.
    pub async fn run(&mut self, ids: &[u32]) -> Result<Vec<RunResult>> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            results.push(self.run_one(id).await?);
        }
        Ok(results)
    }

    async fn run_one(&mut self, id: u32) -> Result<RunResult> {
        let case = TestCase::load(&self.options.root, id, &self.options.shutdown_marker).await?;

        self.session.ensure_running().await?;

        write!(self.out, "Running test{}: ", case.label())?;
        self.out.flush()?;

        let execution = self.client.run(&case).await?;

        let passed = if self.options.verify {
            // Compared even after a timeout so a missing expected file still ends the run
            let matched = outputs_match(&case.paths.expected, &case.paths.actual).await?;
            let exit_ok = !self.options.fail_on_nonzero_exit || execution.exit_code == Some(0);
            Some(matched && exit_ok && !execution.timed_out)
        } else {
            None
        };

        let result = RunResult {
            id,
            label: case.label(),
            elapsed_us: execution.elapsed_us,
            passed,
            exit_code: execution.exit_code,
            timed_out: execution.timed_out,
            contains_shutdown: case.contains_shutdown,
        };

        writeln!(self.out, "{} us{}", result.elapsed_us, result.suffix())?;

        self.session.case_finished(case.contains_shutdown);

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::harness::server::tests::CountingLauncher;
    use crate::harness::server::ServerState;
    use std::path::Path;
    use std::time::Duration;

    fn cat_client() -> ClientRunner {
        ClientRunner::new(PathBuf::from("/bin/cat"), Vec::new(), None)
    }

    fn orchestrator(root: &Path, verify: bool) -> Orchestrator<CountingLauncher, Vec<u8>> {
        Orchestrator::new(
            ServerSession::new(CountingLauncher::default(), Duration::ZERO),
            cat_client(),
            RunOptions {
                root: root.to_path_buf(),
                verify,
                shutdown_marker: "shutdown".to_string(),
                fail_on_nonzero_exit: false,
            },
            Vec::new(),
        )
    }

    /// Verifying orchestrator whose client always exceeds its timeout
    fn timing_out_orchestrator(root: &Path) -> Orchestrator<CountingLauncher, Vec<u8>> {
        let slow_client = ClientRunner::new(
            PathBuf::from("/bin/sh"),
            vec!["-c".to_string(), "sleep 5".to_string()],
            Some(Duration::from_millis(100)),
        );
        Orchestrator::new(
            ServerSession::new(CountingLauncher::default(), Duration::ZERO),
            slow_client,
            RunOptions {
                root: root.to_path_buf(),
                verify: true,
                shutdown_marker: "shutdown".to_string(),
                fail_on_nonzero_exit: false,
            },
            Vec::new(),
        )
    }

    fn output_lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_shared_server_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "create(db,\"awesomebase\")\n").unwrap();
        std::fs::write(dir.path().join("test02.dsl"), "print(a)\nshutdown\n").unwrap();

        let mut orch = orchestrator(dir.path(), false);
        let results = orch.run(&[1, 2]).await.unwrap();

        assert_eq!(orch.session().starts(), 1);
        assert_eq!(orch.session().state(), ServerState::Stopped);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed.is_none()));
        assert!(results[1].contains_shutdown);

        let lines = output_lines(orch.into_output());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Running test01: "));
        assert!(lines[1].starts_with("Running test02: "));
        for line in &lines {
            assert!(line.ends_with(" us"), "unexpected line: {line}");
        }
    }

    #[tokio::test]
    async fn test_server_restarted_after_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "load(\"x\")\n").unwrap();
        std::fs::write(dir.path().join("test02.dsl"), "shutdown\n").unwrap();
        std::fs::write(dir.path().join("test03.dsl"), "select(x)\n").unwrap();

        let mut orch = orchestrator(dir.path(), false);
        orch.run(&[1, 2, 3]).await.unwrap();

        assert_eq!(orch.session().starts(), 2);
        assert_eq!(orch.session().state(), ServerState::Running);
    }

    #[tokio::test]
    async fn test_verification_marks_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "a\n").unwrap();
        std::fs::write(dir.path().join("test01.exp"), "a\n").unwrap();
        std::fs::write(dir.path().join("test02.dsl"), "b\n").unwrap();
        std::fs::write(dir.path().join("test02.exp"), "b").unwrap();
        std::fs::write(dir.path().join("test03.dsl"), "c\n").unwrap();
        std::fs::write(dir.path().join("test03.exp"), "c\n").unwrap();

        let mut orch = orchestrator(dir.path(), true);
        let results = orch.run(&[1, 2, 3]).await.unwrap();

        let verdicts: Vec<Option<bool>> = results.iter().map(|r| r.passed).collect();
        assert_eq!(verdicts, vec![Some(true), Some(false), Some(true)]);

        let lines = output_lines(orch.into_output());
        assert!(lines[0].ends_with(" us"));
        assert!(lines[1].ends_with(" us (FAIL)"));
        assert!(lines[2].ends_with(" us"));
    }

    #[tokio::test]
    async fn test_missing_expected_output_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "a\n").unwrap();
        std::fs::write(dir.path().join("test02.dsl"), "b\n").unwrap();

        let mut orch = orchestrator(dir.path(), true);
        let err = orch.run(&[1, 2]).await.unwrap_err();

        assert!(matches!(err, crate::common::Error::FileRead { .. }));
        // The second test never ran
        assert!(!dir.path().join("test02.out").exists());
    }

    #[tokio::test]
    async fn test_timed_out_client_with_missing_expected_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "a\n").unwrap();

        let mut orch = timing_out_orchestrator(dir.path());

        let err = orch.run(&[1]).await.unwrap_err();
        assert!(matches!(err, crate::common::Error::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_timed_out_client_fails_even_when_output_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "a\n").unwrap();
        std::fs::write(dir.path().join("test01.exp"), "").unwrap();

        let mut orch = timing_out_orchestrator(dir.path());

        let results = orch.run(&[1]).await.unwrap();
        assert!(results[0].timed_out);
        assert_eq!(results[0].passed, Some(false));

        let lines = output_lines(orch.into_output());
        assert!(lines[0].ends_with(" us (TIMEOUT)"));
    }

    #[tokio::test]
    async fn test_missing_script_aborts_before_server_start() {
        let dir = tempfile::tempdir().unwrap();

        let mut orch = orchestrator(dir.path(), false);
        assert!(orch.run(&[4]).await.is_err());
        assert_eq!(orch.session().starts(), 0);
    }

    #[tokio::test]
    async fn test_nonzero_exit_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test01.dsl"), "").unwrap();
        std::fs::write(dir.path().join("test01.exp"), "").unwrap();

        let failing_client = ClientRunner::new(
            PathBuf::from("/bin/sh"),
            vec!["-c".to_string(), "exit 2".to_string()],
            None,
        );
        let options = RunOptions {
            root: dir.path().to_path_buf(),
            verify: true,
            shutdown_marker: "shutdown".to_string(),
            fail_on_nonzero_exit: false,
        };

        let mut lenient = Orchestrator::new(
            ServerSession::new(CountingLauncher::default(), Duration::ZERO),
            failing_client.clone(),
            options.clone(),
            Vec::new(),
        );
        let results = lenient.run(&[1]).await.unwrap();
        assert_eq!(results[0].passed, Some(true));
        assert_eq!(results[0].exit_code, Some(2));

        let mut strict = Orchestrator::new(
            ServerSession::new(CountingLauncher::default(), Duration::ZERO),
            failing_client,
            RunOptions {
                fail_on_nonzero_exit: true,
                ..options
            },
            Vec::new(),
        );
        let results = strict.run(&[1]).await.unwrap();
        assert_eq!(results[0].passed, Some(false));
    }
}
