//! Data root resolution.
//!
//! The root is where `aibot.db` lives unless a database URL is given.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "AIBOT_DATA_DIR";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `AIBOT_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/aibot`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }

    let root = dirs::data_local_dir()
        .ok_or(PathError::NoDataDir)?
        .join("aibot");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}
