//! [`Filesystem`] backed by `std::fs`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsOp};

use super::{Entry, EntryKind, Filesystem};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFs {
    fn list_entries(&self, dir: &Path) -> Result<Vec<Entry>, FsError> {
        let read = fs::read_dir(dir).map_err(|e| FsError::io(FsOp::List, dir, e))?;

        let mut entries = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| FsError::io(FsOp::List, dir, e))?;
            let ty = entry
                .file_type()
                .map_err(|e| FsError::io(FsOp::Stat, &entry.path(), e))?;
            let kind = if ty.is_symlink() {
                EntryKind::Symlink
            } else if ty.is_dir() {
                EntryKind::Dir
            } else if ty.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(Entry::new(entry.file_name(), kind));
        }

        // Sort for deterministic traversal order
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn delete_file(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path).map_err(|e| FsError::io(FsOp::DeleteFile, path, e))
    }

    fn delete_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_dir_all(path).map_err(|e| FsError::io(FsOp::DeleteDir, path, e))
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| FsError::io(FsOp::Copy, src, e))
    }

    fn copy_symlink(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
        let target = fs::read_link(src).map_err(|e| FsError::io(FsOp::Read, src, e))?;
        if let Ok(meta) = fs::symlink_metadata(dst)
            && !meta.is_dir()
        {
            self.delete_file(dst)?;
        }
        create_symlink(&target, dst).map_err(|e| FsError::io(FsOp::Symlink, dst, e))
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path).map_err(|e| FsError::io(FsOp::CreateDir, path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|e| FsError::io(FsOp::Rename, from, e))
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    // Relative targets resolve against the link's directory
    let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Symlinks are not supported on this platform",
    ))
}

/// Remove a file, symlink or directory tree. Returns whether anything was removed.
pub fn remove_path_if_exists(fs: &dyn Filesystem, path: &Path) -> Result<bool, FsError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(FsError::io(FsOp::Stat, path, err)),
    };
    if meta.is_dir() {
        fs.delete_dir_all(path)?;
    } else {
        fs.delete_file(path)?;
    }
    Ok(true)
}

/// Pick a sibling path of `dst` that does not exist yet.
///
/// The name is derived from `dst`'s file name and the process id, so a
/// leftover from a crashed run is never reused.
pub fn unique_temp_path(dst: &Path) -> Result<PathBuf, FsError> {
    let invalid = || {
        FsError::io(
            FsOp::CreateDir,
            dst,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no parent directory or file name",
            ),
        )
    };
    let parent = dst.parent().ok_or_else(invalid)?;
    let base = dst.file_name().ok_or_else(invalid)?;

    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!(".{}.tmp.{}", base.to_string_lossy(), std::process::id())
        } else {
            format!(
                ".{}.tmp.{}.{}",
                base.to_string_lossy(),
                std::process::id(),
                attempt
            )
        };
        let candidate = parent.join(name);
        if std::fs::symlink_metadata(&candidate).is_err() {
            return Ok(candidate);
        }
    }

    Err(FsError::io(
        FsOp::CreateDir,
        dst,
        std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "failed to allocate a unique temp path",
        ),
    ))
}
