//! Filesystem primitives shared across features.
//!
//! Reconciliation never touches `std::fs` directly; it goes through the
//! [`Filesystem`] trait so tests can inject failures and callers can wrap
//! every operation (dry runs, auditing).

pub mod local;
pub mod manifest;

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::Path;

use crate::error::FsError;

pub use local::{LocalFs, remove_path_if_exists, unique_temp_path};
pub use manifest::{FileManifest, file_manifest, manifest_digest};

/// Kind of a listed directory entry. Symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Entry name as used in relative paths and exclusion matching.
    pub fn name_str(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Filesystem operations the reconciler and installers depend on.
pub trait Filesystem: std::fmt::Debug {
    /// List immediate children of `dir`, sorted by name. `.` and `..` are never returned.
    fn list_entries(&self, dir: &Path) -> Result<Vec<Entry>, FsError>;

    fn delete_file(&self, path: &Path) -> Result<(), FsError>;

    fn delete_dir_all(&self, path: &Path) -> Result<(), FsError>;

    /// Copy a regular file, overwriting `dst` if it exists.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), FsError>;

    /// Recreate the symlink `src` at `dst` with the same target, replacing a
    /// file or link already there.
    fn copy_symlink(&self, src: &Path, dst: &Path) -> Result<(), FsError>;

    /// Create `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError>;

    fn exists(&self, path: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;
}
