//! Local change detection for installed packages.
//!
//! Removing a package whose files were edited in place loses those edits, so
//! the orchestrator asks a [`ChangeDetector`] first and reports what it finds.

use std::fmt;
use std::path::Path;

use crate::error::InstallError;
use crate::fs::{FileManifest, file_manifest};
use crate::lockfile::LockfileStore;
use crate::package::PackageIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Modified,
    Added,
    Removed,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Modified => "modified",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: String,
    pub kind: ChangeKind,
}

impl fmt::Display for ChangedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.kind.as_str())
    }
}

pub trait ChangeDetector: fmt::Debug {
    /// Report managed files under `install_path` that differ from what was installed.
    fn detect_local_changes(
        &self,
        package: &PackageIdentity,
        install_path: &Path,
    ) -> Result<Vec<ChangedPath>, InstallError>;
}

/// Detector that never reports anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChangeDetector;

impl ChangeDetector for NoChangeDetector {
    fn detect_local_changes(
        &self,
        _package: &PackageIdentity,
        _install_path: &Path,
    ) -> Result<Vec<ChangedPath>, InstallError> {
        Ok(Vec::new())
    }
}

/// Compares the tree on disk with the manifest recorded in the lockfile.
#[derive(Debug, Clone)]
pub struct ManifestChangeDetector {
    store: LockfileStore,
}

impl ManifestChangeDetector {
    pub fn new(store: LockfileStore) -> Self {
        Self { store }
    }
}

impl ChangeDetector for ManifestChangeDetector {
    fn detect_local_changes(
        &self,
        package: &PackageIdentity,
        install_path: &Path,
    ) -> Result<Vec<ChangedPath>, InstallError> {
        let Some(record) = self.store.get(&package.full_name)? else {
            tracing::debug!(package = %package.full_name, "no install record, skipping change check");
            return Ok(Vec::new());
        };

        let current = if install_path.exists() {
            file_manifest(install_path, &record.exclusion_set()).map_err(|e| {
                InstallError::ChangeDetection {
                    package: package.full_name.clone(),
                    reason: e.to_string(),
                }
            })?
        } else {
            FileManifest::new()
        };

        Ok(diff_manifests(&record.files, &current))
    }
}

/// Changes going from `recorded` to `current`, sorted by path.
pub fn diff_manifests(recorded: &FileManifest, current: &FileManifest) -> Vec<ChangedPath> {
    let mut changes = Vec::new();
    for (path, digest) in recorded {
        match current.get(path) {
            None => changes.push(ChangedPath {
                path: path.clone(),
                kind: ChangeKind::Removed,
            }),
            Some(now) if now != digest => changes.push(ChangedPath {
                path: path.clone(),
                kind: ChangeKind::Modified,
            }),
            Some(_) => {}
        }
    }
    for path in current.keys() {
        if !recorded.contains_key(path) {
            changes.push(ChangedPath {
                path: path.clone(),
                kind: ChangeKind::Added,
            });
        }
    }
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &str)]) -> FileManifest {
        entries
            .iter()
            .map(|(path, digest)| (path.to_string(), digest.to_string()))
            .collect()
    }

    #[test]
    fn diff_reports_each_kind_sorted() {
        let recorded = manifest(&[("a.php", "1"), ("b.php", "2"), ("d.php", "4")]);
        let current = manifest(&[("a.php", "1"), ("b.php", "x"), ("c.php", "3")]);

        let changes = diff_manifests(&recorded, &current);
        let summary: Vec<_> = changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            summary,
            vec!["b.php (modified)", "c.php (added)", "d.php (removed)"]
        );
    }

    #[test]
    fn identical_manifests_have_no_changes() {
        let recorded = manifest(&[("index.php", "abc")]);
        assert!(diff_manifests(&recorded, &recorded.clone()).is_empty());
    }

    #[test]
    fn no_change_detector_is_silent() {
        let identity = PackageIdentity::new("acme/site", "library", "1.0.0");
        let changes = NoChangeDetector
            .detect_local_changes(&identity, Path::new("/nonexistent"))
            .expect("detection should succeed");
        assert!(changes.is_empty());
    }
}
