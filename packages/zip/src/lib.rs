//! Zip container boundary for shrinkfs archives.
//!
//! Import decodes a zip container (or walks a host directory) into an
//! [`Archive`](shrinkfs_archive::Archive); export serializes an archive's
//! `walk()` output back into a zip container.
//!
//! # Example
//!
//! ```rust
//! use shrinkfs_archive::{archive_path, Archive, Asset};
//!
//! let mut archive = Archive::new("app.jar");
//! archive.add_asset(&archive_path!("a/b/c/d.txt"), Asset::from_static(b"d")).unwrap();
//!
//! let bytes = shrinkfs_zip::export_bytes(&archive).unwrap();
//!
//! let mut copy = Archive::new("copy.jar");
//! shrinkfs_zip::import_bytes(&mut copy, "app.jar", bytes).unwrap();
//! assert!(copy.get(&archive_path!("a/b/c/d.txt")).is_some());
//! ```

mod error;
mod export;
mod import;

pub use error::{ExportError, ImportError};
pub use export::{export_bytes, export_to};
pub use import::{import_bytes, import_directory, import_file, import_reader};
