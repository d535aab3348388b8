//! Server lifecycle
//!
//! One server process lives across test cases. It is started lazily before
//! a case when none is running, and considered gone once a case whose
//! script contains the shutdown directive has finished. There is no
//! readiness handshake: after spawning we sleep for a fixed settle delay.

use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;

use crate::common::config::ServerConfig;
use crate::common::{Error, Result};

use super::process::resolve_program;

/// Lifecycle state of the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
}

/// Something that can bring up a fresh server
#[async_trait]
pub trait ServerLauncher: Send {
    /// Start a new server process in the background
    async fn launch(&mut self) -> Result<()>;

    /// Pid of the most recently launched server, if known
    fn pid(&self) -> Option<u32> {
        None
    }
}

/// Launches the configured server binary as a detached process
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<String>,
    log_file: PathBuf,
    child: Option<Child>,
}

impl ProcessLauncher {
    pub fn new(program: PathBuf, args: Vec<String>, log_file: PathBuf) -> Self {
        Self {
            program,
            args,
            log_file,
            child: None,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Ok(Self::new(
            resolve_program(&config.command)?,
            config.args.clone(),
            config.log_file.clone(),
        ))
    }

    /// Collect the exit status of the last server without blocking
    fn reap_previous(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) => tracing::debug!(pid = child.id(), %status, "Previous server exited"),
            Ok(None) => tracing::debug!(pid = child.id(), "Previous server still running"),
            Err(e) => tracing::debug!(pid = child.id(), error = %e, "Failed to poll previous server"),
        }
    }
}

#[async_trait]
impl ServerLauncher for ProcessLauncher {
    async fn launch(&mut self) -> Result<()> {
        self.reap_previous();

        let log = File::create(&self.log_file).map_err(|e| Error::file_write(&self.log_file, e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| Error::file_write(&self.log_file, e))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // Own process group so a Ctrl-C aimed at the harness leaves the server alone
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .map_err(|e| Error::spawn("server", &self.program.display().to_string(), e))?;

        tracing::debug!(
            program = %self.program.display(),
            pid = child.id(),
            log = %self.log_file.display(),
            "Spawned server"
        );

        self.child = Some(child);
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

/// The single server session of a harness run
pub struct ServerSession<L> {
    launcher: L,
    state: ServerState,
    settle_delay: Duration,
    starts: u32,
}

impl<L: ServerLauncher> ServerSession<L> {
    pub fn new(launcher: L, settle_delay: Duration) -> Self {
        Self {
            launcher,
            state: ServerState::Stopped,
            settle_delay,
            starts: 0,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Number of times a server has been started in this session
    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Start the server if it is not running
    ///
    /// Returns true when a new server was started. Control returns only
    /// after the settle delay has elapsed.
    pub async fn ensure_running(&mut self) -> Result<bool> {
        if self.state == ServerState::Running {
            return Ok(false);
        }

        self.launcher.launch().await?;
        self.starts += 1;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        self.state = ServerState::Running;
        tracing::debug!(starts = self.starts, "Server running");
        Ok(true)
    }

    /// Record the outcome of a finished test case
    pub fn case_finished(&mut self, contains_shutdown: bool) {
        if contains_shutdown && self.state == ServerState::Running {
            tracing::debug!(pid = self.launcher.pid(), "Shutdown directive seen, server stopped");
            self.state = ServerState::Stopped;
        }
    }

    /// Log a server left running at the end of the run
    pub fn finish(&self) {
        if self.state == ServerState::Running {
            tracing::info!(
                pid = self.launcher.pid(),
                "Run finished with the server still running"
            );
        }
    }
}
