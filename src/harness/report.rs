//! End-of-run summary and JSON report

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::common::{Error, Result};

use super::orchestrator::RunResult;

/// Aggregate view of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Tests with a verdict that passed
    pub passed: usize,
    /// Labels of failed or timed out tests, in run order
    pub failed: Vec<String>,
    pub total_elapsed_us: u64,
}

impl Summary {
    pub fn from_results(results: &[RunResult]) -> Self {
        let failed = results
            .iter()
            .filter(|r| r.timed_out || r.passed == Some(false))
            .map(|r| r.label.clone())
            .collect();

        Self {
            total: results.len(),
            passed: results.iter().filter(|r| r.passed == Some(true)).count(),
            failed,
            total_elapsed_us: results.iter().map(|r| r.elapsed_us).sum(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Print the verification summary to stdout
    pub fn print(&self) {
        if self.has_failures() {
            println!(
                "\n{} {}/{} passed (failed: {})",
                "✗".red().bold(),
                self.passed,
                self.total,
                self.failed.join(", ")
            );
        } else {
            println!(
                "\n{} {}/{} passed",
                "✓".green().bold(),
                self.passed,
                self.total
            );
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a Summary,
    results: &'a [RunResult],
}

/// Write results and summary as pretty JSON
pub fn write_json(path: &Path, results: &[RunResult]) -> Result<()> {
    let summary = Summary::from_results(results);
    let json = serde_json::to_string_pretty(&Report {
        summary: &summary,
        results,
    })?;
    std::fs::write(path, json).map_err(|e| Error::file_write(path, e))?;
    tracing::debug!(path = %path.display(), "Wrote run report");
    Ok(())
}
