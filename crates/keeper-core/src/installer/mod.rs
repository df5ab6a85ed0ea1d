//! Package installers.
//!
//! [`InstallationOrchestrator`] installs package types that have preserved
//! sub-paths by pruning and merging; everything else goes through
//! [`LibraryInstaller`]. Both share an [`InstallContext`] holding the
//! project root, configuration and collaborators.

pub mod context;
pub mod library;
pub mod orchestrator;

use std::path::{Path, PathBuf};

use crate::changes::ChangedPath;
use crate::error::InstallError;
use crate::package::Package;
use crate::reconcile::ReconcileReport;

pub use context::InstallContext;
pub use library::LibraryInstaller;
pub use orchestrator::InstallationOrchestrator;

/// Sink for human-readable progress lines.
pub trait Reporter: std::fmt::Debug {
    fn write_line(&self, line: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn write_line(&self, _line: &str) {}
}

/// Outcome of one installer operation.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub install_path: PathBuf,
    /// Set when the destination was pruned.
    pub pruned: Option<ReconcileReport>,
    /// Set when the download was merged into the destination.
    pub merged: Option<ReconcileReport>,
    /// Local changes found before removal.
    pub changes: Vec<ChangedPath>,
    pub warnings: Vec<String>,
}

impl InstallReport {
    fn new(install_path: &Path) -> Self {
        Self {
            install_path: install_path.to_path_buf(),
            ..Self::default()
        }
    }

    /// Fold a later step's report into this one.
    fn absorb(&mut self, other: InstallReport) {
        self.install_path = other.install_path;
        self.pruned = other.pruned.or(self.pruned.take());
        self.merged = other.merged.or(self.merged.take());
        self.changes.extend(other.changes);
        self.warnings.extend(other.warnings);
    }
}

pub trait PackageInstaller {
    fn install(&self, package: &Package) -> Result<InstallReport, InstallError>;

    fn update(&self, initial: &Package, target: &Package) -> Result<InstallReport, InstallError>;

    fn remove(&self, package: &Package) -> Result<InstallReport, InstallError>;

    /// Absolute directory the package occupies.
    fn install_path(&self, package: &Package) -> PathBuf;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_earlier_prune_and_later_merge() {
        let mut first = InstallReport::new(Path::new("web"));
        first.pruned = Some(ReconcileReport {
            deleted: vec!["old.php".to_string()],
            ..ReconcileReport::default()
        });
        first.warnings.push("first".to_string());

        let mut second = InstallReport::new(Path::new("web"));
        second.merged = Some(ReconcileReport::default());
        second.warnings.push("second".to_string());

        first.absorb(second);
        assert!(first.pruned.is_some());
        assert!(first.merged.is_some());
        assert_eq!(first.warnings, vec!["first", "second"]);
    }
}
