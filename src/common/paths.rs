//! Configuration file lookup paths

use std::path::PathBuf;

/// Name used for the platform configuration directory
const APP_NAME: &str = "milestone-harness";

/// Config file looked up in the current working directory
pub const LOCAL_CONFIG_FILE: &str = "harness.toml";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/milestone-harness/`
/// - macOS: `~/Library/Application Support/milestone-harness/`
/// - Windows: `%APPDATA%\milestone-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user-wide configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve which config file to load, if any
///
/// An explicit path always wins, even when it does not exist (so the caller
/// reports it). Otherwise `./harness.toml`, then the user config file.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    config_path().filter(|path| path.exists())
}
