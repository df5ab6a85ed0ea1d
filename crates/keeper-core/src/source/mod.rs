//! Package downloads.
//!
//! A [`PackageSource`] places a package's files into an empty directory. The
//! [`DownloadManager`] dispatches on the package's [`SourceRef`].

pub mod archive;
pub mod git;
pub mod path;

use std::path::Path;

use crate::error::FetchError;
use crate::fs::{Filesystem, LocalFs};
use crate::package::{Package, SourceRef};

pub use archive::extract_archive;
pub use git::export_git;
pub use path::copy_tree;

pub trait PackageSource: std::fmt::Debug {
    /// Fetch `package` into `dest`, which must be missing or empty.
    fn download(&self, package: &Package, dest: &Path) -> Result<(), FetchError>;
}

#[derive(Debug)]
pub struct DownloadManager {
    fs: Box<dyn Filesystem>,
}

impl DownloadManager {
    pub fn new(fs: Box<dyn Filesystem>) -> Self {
        Self { fs }
    }

    fn ensure_empty_destination(&self, dest: &Path) -> Result<(), FetchError> {
        if self.fs.exists(dest) && !self.fs.list_entries(dest)?.is_empty() {
            return Err(FetchError::DestinationNotEmpty(dest.to_path_buf()));
        }
        Ok(())
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new(Box::new(LocalFs::new()))
    }
}

impl PackageSource for DownloadManager {
    fn download(&self, package: &Package, dest: &Path) -> Result<(), FetchError> {
        self.ensure_empty_destination(dest)?;
        tracing::debug!(
            package = %package.full_name(),
            source = %package.source,
            dest = %dest.display(),
            "downloading package"
        );

        match &package.source {
            SourceRef::Path { path } => copy_tree(self.fs.as_ref(), path, dest),
            SourceRef::Git { url, reference } => {
                export_git(self.fs.as_ref(), url, reference.as_deref(), dest)
            }
            SourceRef::Archive { path } => extract_archive(path, dest),
        }
    }
}
