//! Lockfile persistence.

use std::path::{Path, PathBuf};

use crate::error::LockfileError;

use super::types::{LockedPackage, Lockfile};

#[derive(Debug, Clone)]
pub struct LockfileStore {
    path: PathBuf,
}

impl LockfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the lockfile; a missing file is an empty lockfile.
    pub fn load(&self) -> Result<Lockfile, LockfileError> {
        if !self.path.exists() {
            return Ok(Lockfile::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| LockfileError::Read {
            path: self.path.clone(),
            source,
        })?;
        let lockfile: Lockfile =
            serde_json::from_str(&content).map_err(|source| LockfileError::Parse {
                path: self.path.clone(),
                source,
            })?;
        lockfile.validate()?;
        Ok(lockfile)
    }

    pub fn save(&self, lockfile: &Lockfile) -> Result<(), LockfileError> {
        let write_err = |source| LockfileError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut lockfile = lockfile.clone();
        lockfile.generated_at = chrono::Utc::now();
        let mut content = serde_json::to_string_pretty(&lockfile)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(write_err)
    }

    pub fn get(&self, name: &str) -> Result<Option<LockedPackage>, LockfileError> {
        Ok(self.load()?.get_package(name).cloned())
    }

    /// Insert or replace the record for `package.name`.
    pub fn record(&self, package: LockedPackage) -> Result<(), LockfileError> {
        let mut lockfile = self.load()?;
        tracing::debug!(package = %package.name, "recording install state");
        lockfile.add_package(package);
        self.save(&lockfile)
    }

    /// Drop the record for `name`. Returns whether one existed.
    pub fn forget(&self, name: &str) -> Result<bool, LockfileError> {
        let mut lockfile = self.load()?;
        if lockfile.remove_package(name).is_none() {
            return Ok(false);
        }
        self.save(&lockfile)?;
        Ok(true)
    }
}
