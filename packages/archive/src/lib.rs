//! shrinkfs archive layer: an in-memory, path-addressed content tree.
//!
//! - `ArchivePath`: normalized absolute path (`/a/b/c`)
//! - `Asset`: a byte source (buffer, host file, or generator)
//! - `Node`: either a `Directory` or an asset leaf
//! - `Archive`: owns the root directory and all nodes below it
//!
//! Nothing here touches the disk except `Asset::from_file` sources when they
//! are opened. Projection of an archive as a filesystem lives in
//! `shrinkfs-vfs`; container formats live in `shrinkfs-zip`.
//!
//! # Example
//!
//! ```rust
//! use shrinkfs_archive::{archive_path, Archive, Asset};
//!
//! let mut archive = Archive::new("test.jar");
//! archive.add_asset(&archive_path!("META-INF/test"), Asset::from_static(b"x")).unwrap();
//! archive.add_asset(&archive_path!("test"), Asset::from_static(b"y")).unwrap();
//!
//! let paths: Vec<String> = archive.walk().map(|(p, _)| p.to_string()).collect();
//! assert_eq!(paths, ["/META-INF", "/META-INF/test", "/test"]);
//! ```

pub use bytes::Bytes;

mod archive;
mod asset;
mod error;
mod node;
mod path;
mod path_trie;
mod walk;

pub use archive::Archive;
pub use asset::{Asset, AssetId, AssetReader, AssetSource, Generator};
pub use error::{ArchiveError, Result};
pub use node::{Directory, Node, NodeKind};
pub use path::{ArchivePath, PathError};
pub use path_trie::{PathTrie, PathTrieIter};
pub use walk::Walk;
