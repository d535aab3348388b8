//! Exact output verification

use std::path::Path;

use crate::common::{Error, Result};

/// Compare expected and actual output byte for byte
///
/// Whitespace and line endings count. A missing expected file is an error,
/// not a failed comparison.
pub async fn outputs_match(expected: &Path, actual: &Path) -> Result<bool> {
    let expected_bytes = tokio::fs::read(expected)
        .await
        .map_err(|e| Error::file_read(expected, e))?;
    let actual_bytes = tokio::fs::read(actual)
        .await
        .map_err(|e| Error::file_read(actual, e))?;

    let matched = expected_bytes == actual_bytes;
    if !matched {
        tracing::debug!(
            expected = %expected.display(),
            expected_len = expected_bytes.len(),
            actual_len = actual_bytes.len(),
            "Output mismatch"
        );
    }
    Ok(matched)
}
