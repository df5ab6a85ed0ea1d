//! Exclusion-aware installation.
//!
//! For package types with preserved sub-paths, an install never replaces the
//! destination wholesale:
//!
//! 1. download into a fresh sibling of the install path
//! 2. prune the install path, keeping exclusions
//! 3. merge the download over it, skipping exclusions
//! 4. delete the download (failure only warns)
//!
//! Removal prunes instead of deleting, so preserved content survives.

use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::exclusion::ExclusionSet;
use crate::fs::{remove_path_if_exists, unique_temp_path};
use crate::package::Package;
use crate::reconcile::TreeReconciler;

use super::{InstallContext, InstallReport, LibraryInstaller, PackageInstaller};

#[derive(Debug)]
pub struct InstallationOrchestrator {
    ctx: InstallContext,
}

impl InstallationOrchestrator {
    pub fn new(ctx: InstallContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &InstallContext {
        &self.ctx
    }

    /// Fallback for package types without exclusions.
    pub fn fallback(&self) -> LibraryInstaller<'_> {
        LibraryInstaller::new(&self.ctx)
    }

    /// Directory the package occupies.
    pub fn base_path(&self, package: &Package) -> PathBuf {
        self.ctx.install_path(&package.identity)
    }

    fn exclusions_for(&self, package: &Package) -> Option<ExclusionSet> {
        self.ctx.config().exclusions_for(package.package_type())
    }

    fn install_except(
        &self,
        package: &Package,
        exclusions: &ExclusionSet,
    ) -> Result<InstallReport, InstallError> {
        let identity = &package.identity;
        let install_path = self.ctx.checked_install_path(identity)?;
        tracing::info!(
            package = %identity.full_name,
            path = %install_path.display(),
            exclusions = exclusions.len(),
            "installing with preserved paths"
        );
        self.ctx
            .report(&format!("  - Installing {} ({})", identity.full_name, identity.version));

        if let Some(parent) = install_path.parent() {
            self.ctx.fs().ensure_dir(parent)?;
        }
        let temp_path = unique_temp_path(&install_path)?;
        let mut report = InstallReport::new(&install_path);

        let reconciled = self
            .ctx
            .source()
            .download(package, &temp_path)
            .map_err(InstallError::from)
            .and_then(|()| self.reconcile(&temp_path, &install_path, exclusions, &mut report));
        self.cleanup(&temp_path, &mut report);
        reconciled?;

        self.ctx.record_install(package, &install_path, exclusions)?;
        Ok(report)
    }

    fn reconcile(
        &self,
        download: &Path,
        install_path: &Path,
        exclusions: &ExclusionSet,
        report: &mut InstallReport,
    ) -> Result<(), InstallError> {
        let reconciler = TreeReconciler::new(self.ctx.fs());
        reconciler.verify_mergeable(download, exclusions)?;
        report.pruned = Some(reconciler.prune_except(install_path, exclusions)?);
        report.merged = Some(reconciler.merge_except(download, install_path, exclusions)?);
        Ok(())
    }

    fn cleanup(&self, temp_path: &Path, report: &mut InstallReport) {
        if let Err(err) = remove_path_if_exists(self.ctx.fs(), temp_path) {
            let warning = format!(
                "Failed to remove temporary download {}: {err}",
                temp_path.display()
            );
            tracing::warn!("{warning}");
            report.warnings.push(warning);
        }
    }

    fn remove_except(
        &self,
        package: &Package,
        exclusions: &ExclusionSet,
    ) -> Result<InstallReport, InstallError> {
        let identity = &package.identity;
        let install_path = self.ctx.checked_install_path(identity)?;
        tracing::info!(
            package = %identity.full_name,
            path = %install_path.display(),
            "removing with preserved paths"
        );
        self.ctx
            .report(&format!("  - Removing {} ({})", identity.full_name, identity.version));

        let mut report = InstallReport::new(&install_path);
        let (changes, warnings) = self.ctx.local_changes(identity, &install_path)?;
        report.changes = changes;
        report.warnings = warnings;

        let reconciler = TreeReconciler::new(self.ctx.fs());
        report.pruned = Some(reconciler.prune_except(&install_path, exclusions)?);
        self.ctx.forget_install(identity)?;
        Ok(report)
    }
}

impl PackageInstaller for InstallationOrchestrator {
    fn install(&self, package: &Package) -> Result<InstallReport, InstallError> {
        match self.exclusions_for(package) {
            Some(exclusions) => self.install_except(package, &exclusions),
            None => self.fallback().install(package),
        }
    }

    /// Full removal then install; the target's type decides the path taken.
    fn update(&self, initial: &Package, target: &Package) -> Result<InstallReport, InstallError> {
        let Some(exclusions) = self.exclusions_for(target) else {
            return self.fallback().update(initial, target);
        };
        tracing::info!(
            package = %target.full_name(),
            from = %initial.version(),
            to = %target.version(),
            "updating with preserved paths"
        );
        let mut report = self.remove_except(initial, &exclusions)?;
        report.absorb(self.install_except(target, &exclusions)?);
        Ok(report)
    }

    fn remove(&self, package: &Package) -> Result<InstallReport, InstallError> {
        match self.exclusions_for(package) {
            Some(exclusions) => self.remove_except(package, &exclusions),
            None => self.fallback().remove(package),
        }
    }

    fn install_path(&self, package: &Package) -> PathBuf {
        self.base_path(package)
    }
}
