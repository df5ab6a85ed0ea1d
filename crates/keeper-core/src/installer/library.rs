use std::path::PathBuf;

use crate::error::InstallError;
use crate::exclusion::ExclusionSet;
use crate::fs::remove_path_if_exists;
use crate::package::Package;

use super::{InstallContext, InstallReport, PackageInstaller};

/// Plain installer: downloads straight into the install path and removes it whole.
#[derive(Debug, Clone, Copy)]
pub struct LibraryInstaller<'a> {
    ctx: &'a InstallContext,
}

impl<'a> LibraryInstaller<'a> {
    pub fn new(ctx: &'a InstallContext) -> Self {
        Self { ctx }
    }
}

impl PackageInstaller for LibraryInstaller<'_> {
    fn install(&self, package: &Package) -> Result<InstallReport, InstallError> {
        let install_path = self.ctx.checked_install_path(&package.identity)?;
        let identity = &package.identity;
        tracing::info!(package = %identity.full_name, path = %install_path.display(), "installing");
        self.ctx
            .report(&format!("  - Installing {} ({})", identity.full_name, identity.version));

        if let Some(parent) = install_path.parent() {
            self.ctx.fs().ensure_dir(parent)?;
        }
        self.ctx.source().download(package, &install_path)?;
        self.ctx
            .record_install(package, &install_path, &ExclusionSet::empty())?;

        Ok(InstallReport::new(&install_path))
    }

    fn update(&self, initial: &Package, target: &Package) -> Result<InstallReport, InstallError> {
        tracing::info!(
            package = %target.full_name(),
            from = %initial.version(),
            to = %target.version(),
            "updating"
        );
        let mut report = self.remove(initial)?;
        report.absorb(self.install(target)?);
        Ok(report)
    }

    fn remove(&self, package: &Package) -> Result<InstallReport, InstallError> {
        let install_path = self.ctx.checked_install_path(&package.identity)?;
        let identity = &package.identity;
        tracing::info!(package = %identity.full_name, path = %install_path.display(), "removing");
        self.ctx
            .report(&format!("  - Removing {} ({})", identity.full_name, identity.version));

        let mut report = InstallReport::new(&install_path);
        let (changes, warnings) = self.ctx.local_changes(identity, &install_path)?;
        report.changes = changes;
        report.warnings = warnings;

        remove_path_if_exists(self.ctx.fs(), &install_path)?;
        self.ctx.forget_install(identity)?;
        Ok(report)
    }

    fn install_path(&self, package: &Package) -> PathBuf {
        self.ctx.install_path(&package.identity)
    }
}
