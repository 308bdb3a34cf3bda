//! Error types for the domain factory.

use std::io;

use shrinkfs_zip::ImportError;
use thiserror::Error;

use crate::extension::ExtensionType;

/// Errors from configuration, domain and archive-factory operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required policy was explicitly unset on the builder.
    #[error("invalid configuration: {0} was explicitly unset")]
    InvalidConfiguration(&'static str),

    /// The domain's extension loader has nothing for the requested type.
    #[error("no extension registered for {0}")]
    UnknownExtensionType(ExtensionType),

    /// Imported bytes could not be decoded as an archive.
    #[error("archive import failed: {0}")]
    ArchiveImport(#[from] ImportError),

    /// A task was submitted to an executor that has stopped.
    #[error("executor '{0}' has shut down")]
    ExecutorShutdown(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
