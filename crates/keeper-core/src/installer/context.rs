use std::path::{Component, Path, PathBuf};

use crate::changes::{ChangeDetector, ChangedPath, NoChangeDetector};
use crate::config::InstallerConfig;
use crate::error::InstallError;
use crate::exclusion::ExclusionSet;
use crate::fs::{Filesystem, LocalFs, file_manifest};
use crate::lockfile::{LockedPackage, LockfileStore};
use crate::package::{Package, PackageIdentity};
use crate::source::{DownloadManager, PackageSource};

use super::{Reporter, SilentReporter};

/// Project root, configuration and collaborators shared by the installers.
#[derive(Debug)]
pub struct InstallContext {
    root: PathBuf,
    config: InstallerConfig,
    fs: Box<dyn Filesystem>,
    source: Box<dyn PackageSource>,
    changes: Box<dyn ChangeDetector>,
    reporter: Box<dyn Reporter>,
    lockfile: Option<LockfileStore>,
}

impl InstallContext {
    /// Context backed by the local filesystem, with silent reporting and no
    /// install state.
    pub fn new(root: PathBuf, config: InstallerConfig) -> Self {
        Self {
            root,
            config,
            fs: Box::new(LocalFs::new()),
            source: Box::new(DownloadManager::default()),
            changes: Box::new(NoChangeDetector),
            reporter: Box::new(SilentReporter),
            lockfile: None,
        }
    }

    pub fn with_filesystem(mut self, fs: Box<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_source(mut self, source: Box<dyn PackageSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_change_detector(mut self, changes: Box<dyn ChangeDetector>) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_lockfile(mut self, store: LockfileStore) -> Self {
        self.lockfile = Some(store);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn source(&self) -> &dyn PackageSource {
        self.source.as_ref()
    }

    pub fn lockfile(&self) -> Option<&LockfileStore> {
        self.lockfile.as_ref()
    }

    pub fn report(&self, line: &str) {
        self.reporter.write_line(line);
    }

    /// Absolute install path for a package.
    pub fn install_path(&self, identity: &PackageIdentity) -> PathBuf {
        self.root.join(self.config.install_path(identity))
    }

    /// Install path that is safe to download into, prune or delete.
    ///
    /// The resolved relative path must name at least one directory below the
    /// project root and never climb out of it.
    pub fn checked_install_path(
        &self,
        identity: &PackageIdentity,
    ) -> Result<PathBuf, InstallError> {
        let relative = self.config.install_path(identity);
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        let named = relative.components().any(|c| matches!(c, Component::Normal(_)));
        let path = self.root.join(relative);
        if escapes || !named {
            return Err(InstallError::InvalidInstallPath {
                package: identity.full_name.clone(),
                path,
            });
        }
        Ok(path)
    }

    /// Check for local edits and surface each one as a warning.
    pub(crate) fn local_changes(
        &self,
        identity: &PackageIdentity,
        install_path: &Path,
    ) -> Result<(Vec<ChangedPath>, Vec<String>), InstallError> {
        let changes = self.changes.detect_local_changes(identity, install_path)?;
        let warnings: Vec<String> = changes
            .iter()
            .map(|change| format!("{} has local changes: {change}", identity.full_name))
            .collect();
        for warning in &warnings {
            tracing::warn!("{warning}");
            self.reporter.write_line(&format!("    {warning}"));
        }
        Ok((changes, warnings))
    }

    /// Record install state when a lockfile store is configured.
    pub(crate) fn record_install(
        &self,
        package: &Package,
        install_path: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<(), InstallError> {
        let Some(store) = &self.lockfile else {
            return Ok(());
        };
        let files = file_manifest(install_path, exclusions)?;
        let relative = self.config.install_path(&package.identity);
        store.record(LockedPackage::new(package, relative, files).with_exclusions(exclusions))?;
        Ok(())
    }

    pub(crate) fn forget_install(&self, identity: &PackageIdentity) -> Result<(), InstallError> {
        if let Some(store) = &self.lockfile {
            store.forget(&identity.full_name)?;
        }
        Ok(())
    }
}
