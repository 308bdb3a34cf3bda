//! Error types for the filesystem view.

use std::io;

use shrinkfs_archive::ArchivePath;
use thiserror::Error;

/// Errors from filesystem operations on a mounted archive.
///
/// Query methods (`exists`, `is_directory`, `is_file`) never produce these;
/// only operations that need a node of a particular kind do.
#[derive(Debug, Error)]
pub enum FsError {
    /// Nothing lives at the path.
    #[error("no such file or directory: {0}")]
    NotFound(ArchivePath),

    /// A directory operation was attempted on an asset.
    #[error("not a directory: {0}")]
    NotADirectory(ArchivePath),

    /// A file operation was attempted on a directory.
    #[error("is a directory: {0}")]
    IsADirectory(ArchivePath),

    /// A mount point is already taken.
    #[error("mount point already in use: {0}")]
    MountPointBusy(ArchivePath),

    /// The underlying source or spill storage failed.
    #[error("I/O error on {path}: {error}")]
    Io {
        path: ArchivePath,
        #[source]
        error: io::Error,
    },
}

impl FsError {
    pub fn io(path: &ArchivePath, error: io::Error) -> Self {
        FsError::Io {
            path: path.clone(),
            error,
        }
    }

    /// The same error, reported against `path` instead.
    ///
    /// Used when a request is routed to a sub-filesystem and the error
    /// should name the path the caller asked for.
    pub fn at(self, path: &ArchivePath) -> Self {
        let path = path.clone();
        match self {
            FsError::NotFound(_) => FsError::NotFound(path),
            FsError::NotADirectory(_) => FsError::NotADirectory(path),
            FsError::IsADirectory(_) => FsError::IsADirectory(path),
            FsError::MountPointBusy(_) => FsError::MountPointBusy(path),
            FsError::Io { error, .. } => FsError::Io { path, error },
        }
    }

    /// The `io::ErrorKind` this error maps to.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            FsError::NotFound(_) => io::ErrorKind::NotFound,
            FsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            FsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            FsError::MountPointBusy(_) => io::ErrorKind::AlreadyExists,
            FsError::Io { error, .. } => error.kind(),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        io::Error::new(error.kind(), error)
    }
}

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;
