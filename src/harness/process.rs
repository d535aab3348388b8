//! Helpers for locating the external programs the harness drives

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Resolve a configured command to an executable path
///
/// Commands containing a path separator (`./server`, `bin/client`) are used
/// as given and may not exist yet, since the build step can create them.
/// Bare names are looked up on `PATH`.
pub fn resolve_program(command: &str) -> Result<PathBuf> {
    let path = Path::new(command);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    which::which(command).map_err(|_| Error::ExecutableNotFound(command.to_string()))
}
