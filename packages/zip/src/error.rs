//! Error types for zip import and export.

use std::io;

use shrinkfs_archive::ArchiveError;
use thiserror::Error;
use zip::result::ZipError;

/// Failure to turn external bytes into an archive.
///
/// Every variant carries the identifier of the offending source so callers
/// can report which input was bad.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The bytes are not a container we can decode.
    #[error("{source_id} is not a readable zip container: {error}")]
    Malformed {
        source_id: String,
        #[source]
        error: ZipError,
    },

    /// Reading the source failed.
    #[error("I/O error while importing {source_id}: {error}")]
    Io {
        source_id: String,
        #[source]
        error: io::Error,
    },

    /// An entry decoded fine but collides with another entry.
    #[error("entry '{entry}' in {source_id} cannot be placed: {error}")]
    Entry {
        source_id: String,
        entry: String,
        #[source]
        error: ArchiveError,
    },
}

impl ImportError {
    /// Identifier of the source that failed to import.
    pub fn source_id(&self) -> &str {
        match self {
            ImportError::Malformed { source_id, .. }
            | ImportError::Io { source_id, .. }
            | ImportError::Entry { source_id, .. } => source_id,
        }
    }
}

/// Failure to serialize an archive.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
