//! Exclusion-aware tree reconciliation.
//!
//! Two operations share one traversal:
//! - [`TreeReconciler::prune_except`] empties a destination tree of everything
//!   an [`ExclusionSet`] does not protect.
//! - [`TreeReconciler::merge_except`] copies a source tree over a destination,
//!   skipping exact exclusions so preserved content is never overwritten.
//!
//! Pruning then merging is how a package is reinstalled without losing
//! locally generated or modified content.

use std::path::Path;

use crate::error::FsError;
use crate::exclusion::{ExclusionSet, RelativePath};
use crate::fs::{Entry, EntryKind, Filesystem};

/// What the traversal does with one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the entry from the listed tree (directories in one operation).
    Delete,
    /// Walk into the directory with an extended prefix.
    Recurse,
    /// Leave the entry alone.
    Skip,
    /// Copy the entry from the listed tree into the target tree.
    Copy,
}

/// Relative paths touched by one reconciliation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub deleted: Vec<String>,
    pub copied: Vec<String>,
    pub preserved: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.copied.is_empty()
    }
}

/// Decision rule for pruning.
///
/// Anything that is neither an exclusion nor an ancestor of one is deleted
/// outright. Ancestor directories are walked so siblings of the deeper
/// exclusion can still be pruned; exact matches are left whole.
pub fn prune_action(entry: &Entry, candidate: &str, exclusions: &ExclusionSet) -> Action {
    if !exclusions.is_ancestor_or_exact(candidate) {
        Action::Delete
    } else if entry.is_dir() && !exclusions.is_exact_match(candidate) {
        Action::Recurse
    } else {
        Action::Skip
    }
}

/// Decision rule for merging: exact exclusions are skipped, directories walked, files copied.
pub fn merge_action(entry: &Entry, candidate: &str, exclusions: &ExclusionSet) -> Action {
    if exclusions.is_exact_match(candidate) {
        Action::Skip
    } else if entry.is_dir() {
        Action::Recurse
    } else {
        Action::Copy
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeReconciler<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> TreeReconciler<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    /// Delete everything under `root` that `exclusions` does not protect.
    ///
    /// A missing `root` is treated as already empty. The first failed
    /// deletion aborts the walk; entries removed before it stay removed.
    pub fn prune_except(
        &self,
        root: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<ReconcileReport, FsError> {
        let mut report = ReconcileReport::default();
        if !self.fs.exists(root) {
            tracing::debug!(root = %root.display(), "nothing to prune");
            return Ok(report);
        }

        let walk = Walk {
            fs: self.fs,
            exclusions,
            create_target: false,
        };
        walk.run(root, root, &RelativePath::root(), &prune_action, &mut report)?;
        Ok(report)
    }

    /// Fail with [`FsError::Unsupported`] if `source` holds an entry that
    /// [`merge_except`](Self::merge_except) would have to copy but cannot.
    ///
    /// Nothing is written, so callers can run this before pruning.
    pub fn verify_mergeable(
        &self,
        source: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<(), FsError> {
        let walk = Walk {
            fs: self.fs,
            exclusions,
            create_target: false,
        };
        walk.scan(source, &RelativePath::root())
    }

    /// Copy `source` into `destination`, creating directories as needed and
    /// skipping exact exclusions. Symlinks are recreated with their original
    /// target. Destination-only entries are left untouched.
    pub fn merge_except(
        &self,
        source: &Path,
        destination: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<ReconcileReport, FsError> {
        let mut report = ReconcileReport::default();
        let walk = Walk {
            fs: self.fs,
            exclusions,
            create_target: true,
        };
        walk.run(
            source,
            destination,
            &RelativePath::root(),
            &merge_action,
            &mut report,
        )?;
        Ok(report)
    }
}

/// Shorthand for [`TreeReconciler::prune_except`].
pub fn prune_except(
    fs: &dyn Filesystem,
    root: &Path,
    exclusions: &ExclusionSet,
) -> Result<ReconcileReport, FsError> {
    TreeReconciler::new(fs).prune_except(root, exclusions)
}

/// Shorthand for [`TreeReconciler::merge_except`].
pub fn merge_except(
    fs: &dyn Filesystem,
    source: &Path,
    destination: &Path,
    exclusions: &ExclusionSet,
) -> Result<ReconcileReport, FsError> {
    TreeReconciler::new(fs).merge_except(source, destination, exclusions)
}

struct Walk<'a> {
    fs: &'a dyn Filesystem,
    exclusions: &'a ExclusionSet,
    create_target: bool,
}

impl Walk<'_> {
    /// Visit every entry of `listed`, applying `decide`'s action. `target` is
    /// the mirror directory that copies land in; pruning passes `listed` itself.
    fn run<D>(
        &self,
        listed: &Path,
        target: &Path,
        prefix: &RelativePath,
        decide: &D,
        report: &mut ReconcileReport,
    ) -> Result<(), FsError>
    where
        D: Fn(&Entry, &str, &ExclusionSet) -> Action,
    {
        if self.create_target {
            self.fs.ensure_dir(target)?;
        }

        for entry in self.fs.list_entries(listed)? {
            let candidate = prefix.candidate(&entry.name_str());
            let from = listed.join(&entry.name);

            match decide(&entry, &candidate, self.exclusions) {
                Action::Delete => {
                    if entry.is_dir() {
                        self.fs.delete_dir_all(&from)?;
                    } else {
                        self.fs.delete_file(&from)?;
                    }
                    tracing::debug!(path = %candidate, "deleted");
                    report.deleted.push(candidate);
                }
                Action::Recurse => {
                    let next = prefix.descend(&entry.name_str(), self.exclusions.separator());
                    let to = target.join(&entry.name);
                    self.run(&from, &to, &next, decide, report)?;
                }
                Action::Copy => {
                    let to = target.join(&entry.name);
                    match entry.kind {
                        EntryKind::File => self.fs.copy_file(&from, &to)?,
                        EntryKind::Symlink => self.fs.copy_symlink(&from, &to)?,
                        EntryKind::Dir | EntryKind::Other => {
                            return Err(FsError::Unsupported(from));
                        }
                    }
                    tracing::debug!(path = %candidate, "copied");
                    report.copied.push(candidate);
                }
                Action::Skip => {
                    tracing::debug!(path = %candidate, "preserved");
                    report.preserved.push(candidate);
                }
            }
        }
        Ok(())
    }

    /// Walk `listed` with the merge rule and reject entries that cannot be copied.
    fn scan(&self, listed: &Path, prefix: &RelativePath) -> Result<(), FsError> {
        for entry in self.fs.list_entries(listed)? {
            let candidate = prefix.candidate(&entry.name_str());
            match merge_action(&entry, &candidate, self.exclusions) {
                Action::Recurse => {
                    let next = prefix.descend(&entry.name_str(), self.exclusions.separator());
                    self.scan(&listed.join(&entry.name), &next)?;
                }
                Action::Copy if entry.kind == EntryKind::Other => {
                    return Err(FsError::Unsupported(listed.join(&entry.name)));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
