//! shrinkfs: assemble archives in memory, then mount them as read-only
//! filesystems.
//!
//! This crate re-exports the workspace layers:
//!
//! - [`archive`]: the path-addressed content tree
//! - [`zip`]: zip container import and export
//! - [`vfs`]: the filesystem view, spill cache and mount table
//! - [`domain`]: configurations, domains and typed archive façades
//!
//! # Example
//!
//! ```rust
//! use shrinkfs::archive::{archive_path, Asset};
//! use shrinkfs::domain::{Assignable, DomainService, JavaArchive};
//! use shrinkfs::vfs::{ArchiveFileSystem, FileSystem};
//!
//! let mut jar: JavaArchive = DomainService::new().create_named("test.jar").unwrap();
//! jar.add_resource("META-INF/test", Asset::from_static(b"META-INF/test")).unwrap();
//!
//! let fs = ArchiveFileSystem::new(jar.archive());
//! assert!(fs.is_directory(&archive_path!("META-INF")));
//! assert_eq!(fs.read(&archive_path!("META-INF/test")).unwrap(), b"META-INF/test");
//! fs.close();
//! ```

pub use shrinkfs_archive as archive;
pub use shrinkfs_domain as domain;
pub use shrinkfs_vfs as vfs;
pub use shrinkfs_zip as zip;
