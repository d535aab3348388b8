//! Error types for the test harness
//!
//! Only conditions that end the whole run are errors. Invalid selections
//! are warnings and a failed comparison is a verdict, not an error.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Failed to spawn {role} '{program}': {error}")]
    ProcessSpawn {
        role: &'static str,
        program: String,
        error: String,
    },

    #[error("Failed to wait for {role}: {source}")]
    ProcessWait {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Executable '{0}' not found. Check the [server]/[client] commands in the harness config")]
    ExecutableNotFound(String),

    // === Corpus Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a spawn error for a named process role (server, client, build)
    pub fn spawn(role: &'static str, program: &str, error: io::Error) -> Self {
        Self::ProcessSpawn {
            role,
            program: program.to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error
    pub fn file_write(path: &Path, error: io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
