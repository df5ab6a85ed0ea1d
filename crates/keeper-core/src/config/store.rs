//! Config store for locating and loading keeper.toml.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::paths::{config_path_candidates, global_config_dir};
use super::{InstallerConfig, parser};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: Option<PathBuf>,
    project_root: PathBuf,
}

impl ConfigStore {
    /// Locate the config for `project_root`: `./keeper.toml`, then the user config dir.
    pub fn discover(project_root: PathBuf) -> Self {
        Self::discover_with_global_dir(project_root, global_config_dir())
    }

    pub fn discover_with_global_dir(project_root: PathBuf, global_dir: Option<PathBuf>) -> Self {
        let config_path = config_path_candidates(&project_root, global_dir.as_deref())
            .into_iter()
            .find(|p| p.is_file());
        Self {
            config_path,
            project_root,
        }
    }

    /// Use an explicit config file; it must exist when loaded.
    pub fn from_path(config_path: PathBuf, project_root: PathBuf) -> Self {
        Self {
            config_path: Some(config_path),
            project_root,
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load the config, or the defaults when no config file was found.
    pub fn load(&self) -> Result<InstallerConfig, ConfigError> {
        match &self.config_path {
            Some(path) => {
                let config = parser::parse_keeper_toml(path)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            None => {
                tracing::debug!(
                    root = %self.project_root.display(),
                    "no keeper.toml found, using defaults"
                );
                Ok(InstallerConfig::new())
            }
        }
    }

    /// Path of the install state file for this project.
    pub fn lockfile_path(&self, config: &InstallerConfig) -> PathBuf {
        self.project_root.join(&config.installer.lockfile)
    }
}
