//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::resolve_config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Server process settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Client process settings
    #[serde(default)]
    pub client: ClientConfig,

    /// External build step
    #[serde(default)]
    pub build: BuildConfig,

    /// Test corpus layout
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Server process configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server executable
    #[serde(default = "default_server_command")]
    pub command: String,

    /// Additional arguments passed to the server
    #[serde(default)]
    pub args: Vec<String>,

    /// File receiving the server's stdout and stderr
    #[serde(default = "default_server_log")]
    pub log_file: PathBuf,

    /// Time given to the server to bind before the first client runs
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: default_server_command(),
            args: Vec::new(),
            log_file: default_server_log(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl ServerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_server_command() -> String {
    "./server".to_string()
}
fn default_server_log() -> PathBuf {
    PathBuf::from("server.out")
}
fn default_settle_delay() -> u64 {
    1000
}

/// Client process configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Client executable
    #[serde(default = "default_client_command")]
    pub command: String,

    /// Additional arguments passed to the client
    #[serde(default)]
    pub args: Vec<String>,

    /// Kill a client that runs longer than this. No limit when unset.
    #[serde(default)]
    pub client_timeout_secs: Option<u64>,

    /// Count a non-zero client exit as a failed case when verifying
    #[serde(default)]
    pub fail_on_nonzero_exit: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command: default_client_command(),
            args: Vec::new(),
            client_timeout_secs: None,
            fail_on_nonzero_exit: false,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.client_timeout_secs.map(Duration::from_secs)
    }
}

fn default_client_command() -> String {
    "./client".to_string()
}

/// Build step configuration
///
/// Each entry is a program followed by its arguments.
#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// Run before a full default selection
    #[serde(default = "default_clean")]
    pub clean: Vec<String>,

    /// Run before every selection
    #[serde(default = "default_build")]
    pub build: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            clean: default_clean(),
            build: default_build(),
        }
    }
}

fn default_clean() -> Vec<String> {
    vec!["make".to_string(), "clean".to_string()]
}
fn default_build() -> Vec<String> {
    vec!["make".to_string()]
}

/// Test corpus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// Root of the regular corpus
    #[serde(default = "default_small_root")]
    pub small_root: PathBuf,

    /// Root of the large-dataset corpus
    #[serde(default = "default_large_root")]
    pub large_root: PathBuf,

    /// Text whose presence in a script means the server exits during that case
    #[serde(default = "default_shutdown_marker")]
    pub shutdown_marker: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            small_root: default_small_root(),
            large_root: default_large_root(),
            shutdown_marker: default_shutdown_marker(),
        }
    }
}

impl CorpusConfig {
    /// Corpus root for the chosen dataset size
    pub fn root(&self, large: bool) -> &Path {
        if large {
            &self.large_root
        } else {
            &self.small_root
        }
    }
}

fn default_small_root() -> PathBuf {
    PathBuf::from("../project_tests")
}
fn default_large_root() -> PathBuf {
    PathBuf::from("../project_tests_1M")
}
fn default_shutdown_marker() -> String {
    "shutdown".to_string()
}

impl Config {
    /// Load configuration, falling back to defaults when no file is found
    ///
    /// See [`resolve_config_path`] for the lookup order.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        tracing::debug!(path = %path.display(), "Loaded harness config");
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.command.trim().is_empty() {
            return Err(super::Error::Config("server.command is empty".to_string()));
        }
        if self.client.command.trim().is_empty() {
            return Err(super::Error::Config("client.command is empty".to_string()));
        }
        if self.corpus.shutdown_marker.is_empty() {
            return Err(super::Error::Config(
                "corpus.shutdown_marker is empty".to_string(),
            ));
        }
        Ok(())
    }
}
