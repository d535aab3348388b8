//! Test corpus layout
//!
//! Maps a test identifier to its files under a corpus root. Nothing here
//! touches the filesystem except [`TestCase::load`], which reads the script
//! once to find the shutdown directive.

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Render a test identifier the way corpus file names spell it
///
/// Identifiers below 10 are zero-padded to two digits.
pub fn test_label(id: u32) -> String {
    format!("{:02}", id)
}

/// The three files belonging to one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPaths {
    /// Script fed to the client on stdin
    pub input: PathBuf,
    /// Expected client output
    pub expected: PathBuf,
    /// Where the client's output is written
    pub actual: PathBuf,
}

impl TestPaths {
    pub fn new(root: &Path, id: u32) -> Self {
        let stem = format!("test{}", test_label(id));
        Self {
            input: root.join(format!("{stem}.dsl")),
            expected: root.join(format!("{stem}.exp")),
            actual: root.join(format!("{stem}.out")),
        }
    }
}

/// A single test case ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: u32,
    pub paths: TestPaths,
    /// Whether the script tells the server to shut down
    pub contains_shutdown: bool,
}

impl TestCase {
    /// Build a test case, scanning its script for the shutdown marker
    ///
    /// A missing script is an error: the client could not run it either.
    pub async fn load(root: &Path, id: u32, shutdown_marker: &str) -> Result<Self> {
        let paths = TestPaths::new(root, id);
        let script = tokio::fs::read(&paths.input)
            .await
            .map_err(|e| Error::file_read(&paths.input, e))?;

        Ok(Self {
            id,
            contains_shutdown: contains_marker(&script, shutdown_marker),
            paths,
        })
    }

    pub fn label(&self) -> String {
        test_label(self.id)
    }
}

/// Check whether a script contains the marker anywhere in its text
pub fn contains_marker(script: &[u8], marker: &str) -> bool {
    let marker = marker.as_bytes();
    !marker.is_empty() && script.windows(marker.len()).any(|window| window == marker)
}
