//! Database path resolution.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::data_root;

/// Get the path to the `aibot.db` database file under the data root.
///
/// The root directory is created if it doesn't exist.
pub fn database_path() -> Result<PathBuf, PathError> {
    database_path_in(&data_root()?)
}

/// Path of `aibot.db` under `root`, creating `root` when missing.
pub fn database_path_in(root: &Path) -> Result<PathBuf, PathError> {
    fs::create_dir_all(root).map_err(|e| PathError::CreateFailed {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(root.join("aibot.db"))
}
