//! Per-file content manifests for change detection
//!
//! A manifest maps every managed file under an install root (relative path,
//! joined with the exclusion set's separator) to the blake3 digest of its
//! content. Excluded sub-trees are not managed and are left out.
//!
//! Symlinks are recorded by their target rather than followed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{FsError, FsOp};
use crate::exclusion::{ExclusionSet, RelativePath};

pub type FileManifest = BTreeMap<String, String>;

/// Hash every managed file under `root`.
///
/// # Example
/// ```no_run
/// use keeper_core::exclusion::ExclusionSet;
/// use keeper_core::fs::file_manifest;
/// use std::path::Path;
///
/// let manifest = file_manifest(Path::new("web"), &ExclusionSet::new(["sites/"]))?;
/// assert!(manifest.keys().all(|p| !p.starts_with("sites/")));
/// # Ok::<(), keeper_core::error::FsError>(())
/// ```
pub fn file_manifest(root: &Path, exclusions: &ExclusionSet) -> Result<FileManifest, FsError> {
    let mut manifest = FileManifest::new();
    hash_dir_recursive(&mut manifest, root, &RelativePath::root(), exclusions)?;
    Ok(manifest)
}

/// Single digest over a manifest, stable across creation order.
pub fn manifest_digest(manifest: &FileManifest) -> String {
    let mut hasher = blake3::Hasher::new();
    for (path, digest) in manifest {
        hasher.update(path.as_bytes());
        hasher.update(&[0x00]);
        hasher.update(digest.as_bytes());
        hasher.update(&[0xFF]);
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_dir_recursive(
    manifest: &mut FileManifest,
    dir: &Path,
    prefix: &RelativePath,
    exclusions: &ExclusionSet,
) -> Result<(), FsError> {
    let entries = fs::read_dir(dir).map_err(|e| FsError::io(FsOp::List, dir, e))?;

    let mut sorted_entries: Vec<_> = entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FsError::io(FsOp::List, dir, e))?;
    sorted_entries.sort_by_key(|e| e.file_name());

    for entry in sorted_entries {
        let name = entry.file_name();
        let rel_path = prefix.candidate(&name.to_string_lossy());
        if exclusions.is_exact_match(&rel_path) {
            continue;
        }

        let path = entry.path();
        let ty = entry
            .file_type()
            .map_err(|e| FsError::io(FsOp::Stat, &path, e))?;

        if ty.is_dir() {
            let next = prefix.descend(&name.to_string_lossy(), exclusions.separator());
            hash_dir_recursive(manifest, &path, &next, exclusions)?;
        } else if ty.is_file() {
            let content = fs::read(&path).map_err(|e| FsError::io(FsOp::Read, &path, e))?;
            manifest.insert(rel_path, blake3::hash(&content).to_hex().to_string());
        } else if ty.is_symlink() {
            let target = fs::read_link(&path).map_err(|e| FsError::io(FsOp::Read, &path, e))?;
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"symlink\0");
            hasher.update(target.to_string_lossy().as_bytes());
            manifest.insert(rel_path, hasher.finalize().to_hex().to_string());
        } else {
            return Err(FsError::Unsupported(path));
        }
    }

    Ok(())
}
