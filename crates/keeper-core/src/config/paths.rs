//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "keeper.toml";

/// Project config first, then the user-wide config.
pub fn config_path_candidates(project_root: &Path, global_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![project_root.join(CONFIG_FILE_NAME)];
    if let Some(global_dir) = global_dir {
        candidates.push(global_dir.join(CONFIG_FILE_NAME));
    }
    candidates
}

/// User-wide config directory (`~/.config/keeper` on Linux).
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("keeper"))
}
