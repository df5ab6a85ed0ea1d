//! Error types for reconciliation, downloads and install state.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Filesystem operation that failed, used in [`FsError`] messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    List,
    Stat,
    DeleteFile,
    DeleteDir,
    Copy,
    Symlink,
    CreateDir,
    Read,
    Write,
    Rename,
}

impl FsOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FsOp::List => "list directory",
            FsOp::Stat => "stat",
            FsOp::DeleteFile => "delete file",
            FsOp::DeleteDir => "delete directory",
            FsOp::Copy => "copy",
            FsOp::Symlink => "create symlink",
            FsOp::CreateDir => "create directory",
            FsOp::Read => "read",
            FsOp::Write => "write",
            FsOp::Rename => "rename",
        }
    }
}

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Failed to {} {}: {source}", op.as_str(), path.display())]
    Io {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported filesystem entry type at {}", .0.display())]
    Unsupported(PathBuf),
}

impl FsError {
    pub fn io(op: FsOp, path: &Path, source: io::Error) -> Self {
        FsError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            FsError::Io { path, .. } => path,
            FsError::Unsupported(path) => path,
        }
    }

    /// Underlying I/O error kind, if the failure came from the OS.
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            FsError::Io { source, .. } => Some(source.kind()),
            FsError::Unsupported(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Package source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Download destination is not empty: {}", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("Git fetch of {url} failed: {source}")]
    Git {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to extract archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("Failed to read lockfile {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse lockfile {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write lockfile {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported lockfile version: {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Fs(#[from] FsError),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    #[error("Install path for {package} must be a directory inside the project root: {}", path.display())]
    InvalidInstallPath { package: String, path: PathBuf },

    #[error("Failed to check {package} for local changes: {reason}")]
    ChangeDetection { package: String, reason: String },
}
