//! Error types for archive mutation.

use thiserror::Error;

use crate::node::NodeKind;
use crate::path::{ArchivePath, PathError};

/// Errors raised while mutating an [`Archive`](crate::Archive).
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Path parsing failed.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A directory and an asset collided at `path`.
    #[error("path conflict at {path}: existing {existing} is in the way")]
    PathConflict { path: ArchivePath, existing: NodeKind },

    /// The root can only ever be a directory.
    #[error("an asset cannot be stored at the archive root")]
    RootPath,
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
