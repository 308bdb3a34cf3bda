//! Read-only filesystem view over shrinkfs archives.
//!
//! - `FileSystem`: the contract a host VFS layer consumes
//! - `ArchiveFileSystem`: one archive, mounted by borrow
//! - `MountTable`: several filesystems under one namespace
//! - `VirtualFile`: a path handle bound to a filesystem
//!
//! Assets whose source can only be consumed once are copied into a
//! per-mount `SpillCache` on first open. The cache's temp directory is only
//! created if something spills, and is removed on `close` (or drop).
//!
//! # Example
//!
//! ```rust
//! use std::io::Read;
//! use shrinkfs_archive::{archive_path, Archive, Asset};
//! use shrinkfs_vfs::{ArchiveFileSystem, FileSystem};
//!
//! let mut archive = Archive::new("test.jar");
//! archive.add_asset(&archive_path!("META-INF/test"), Asset::from_static(b"META-INF/test")).unwrap();
//!
//! let fs = ArchiveFileSystem::new(&archive);
//! let mut content = String::new();
//! fs.open_stream(&archive_path!("META-INF/test"))
//!     .unwrap()
//!     .read_to_string(&mut content)
//!     .unwrap();
//! assert_eq!(content, "META-INF/test");
//! fs.close();
//! ```

mod error;
mod filesystem;
mod mount_table;
mod settings;
mod spill;
mod stream;
mod virtual_file;

pub use error::{FsError, Result};
pub use filesystem::{ArchiveFileSystem, FileSystem, Metadata};
pub use mount_table::MountTable;
pub use settings::SpillSettings;
pub use spill::SpillCache;
pub use stream::AssetStream;
pub use virtual_file::VirtualFile;
