//! Keeper Core Library
//!
//! Installs packages into configurable locations while preserving
//! designated sub-paths of the destination across install, update and
//! removal.

pub mod changes;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod fs;
pub mod installer;
pub mod lockfile;
pub mod package;
pub mod reconcile;
pub mod source;
pub mod template;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, InstallerConfig};

    // Packages
    pub use crate::package::{Package, PackageIdentity, SourceRef};

    // Reconciliation
    pub use crate::exclusion::ExclusionSet;
    pub use crate::reconcile::{ReconcileReport, TreeReconciler, merge_except, prune_except};

    // Installers
    pub use crate::installer::{
        InstallContext, InstallReport, InstallationOrchestrator, LibraryInstaller,
        PackageInstaller, Reporter, SilentReporter,
    };

    // Collaborators
    pub use crate::changes::{ChangeDetector, ManifestChangeDetector, NoChangeDetector};
    pub use crate::fs::{Filesystem, LocalFs};
    pub use crate::source::{DownloadManager, PackageSource};

    // Install state
    pub use crate::lockfile::{LockedPackage, LockfileStore};

    // Errors
    pub use crate::error::{ConfigError, FetchError, FsError, InstallError, LockfileError};
}
