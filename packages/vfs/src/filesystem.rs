//! The filesystem contract and its archive-backed implementation.

use std::fs::File;

use shrinkfs_archive::{Archive, ArchivePath, AssetSource, Node, NodeKind};

use crate::error::{FsError, Result};
use crate::settings::SpillSettings;
use crate::spill::SpillCache;
use crate::stream::AssetStream;
use crate::virtual_file::VirtualFile;

/// Kind and size of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    kind: NodeKind,
    len: Option<u64>,
}

impl Metadata {
    pub fn directory() -> Self {
        Self {
            kind: NodeKind::Directory,
            len: None,
        }
    }

    pub fn file(len: Option<u64>) -> Self {
        Self {
            kind: NodeKind::Asset,
            len,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::Asset
    }

    /// Declared content length, when known. Always `None` for directories.
    pub fn len(&self) -> Option<u64> {
        self.len
    }
}

/// The operations a host virtual-filesystem layer needs from a mount.
///
/// Paths are already-normalized [`ArchivePath`]s; raw platform strings
/// never cross this boundary. The query methods never fail: absence is a
/// `false`, not an error.
pub trait FileSystem: Send + Sync {
    /// Kind and length of the entry at `path`.
    fn metadata(&self, path: &ArchivePath) -> Result<Metadata>;

    /// Full paths of the direct children of the directory at `path`.
    fn list_children(&self, path: &ArchivePath) -> Result<Vec<ArchivePath>>;

    /// A stream over the content of the file at `path`, at offset 0.
    fn open_stream(&self, path: &ArchivePath) -> Result<AssetStream>;

    /// Release resources held by this mount. Idempotent and infallible.
    fn close(&self);

    fn exists(&self, path: &ArchivePath) -> bool {
        self.metadata(path).is_ok()
    }

    fn is_directory(&self, path: &ArchivePath) -> bool {
        self.metadata(path).is_ok_and(|m| m.is_dir())
    }

    fn is_file(&self, path: &ArchivePath) -> bool {
        self.metadata(path).is_ok_and(|m| m.is_file())
    }

    /// Read the whole content of the file at `path`.
    fn read(&self, path: &ArchivePath) -> Result<Vec<u8>> {
        self.open_stream(path)?
            .read_to_vec()
            .map_err(|e| FsError::io(path, e))
    }
}

/// A read-only filesystem view of one [`Archive`].
///
/// The view borrows the archive, so the archive cannot be mutated (or
/// dropped) while mounted. Repeatable sources are opened directly on every
/// `open_stream`; generated sources are spilled into this mount's
/// [`SpillCache`] on first open and served from there afterwards.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::{archive_path, Archive, Asset};
/// use shrinkfs_vfs::{ArchiveFileSystem, FileSystem};
///
/// let mut archive = Archive::new("test.jar");
/// archive.add_asset(&archive_path!("META-INF/test"), Asset::from_static(b"x")).unwrap();
///
/// let fs = ArchiveFileSystem::new(&archive);
/// assert!(fs.is_directory(&archive_path!("META-INF")));
/// assert!(!fs.is_directory(&archive_path!("META-INF/missing")));
/// assert_eq!(fs.read(&archive_path!("META-INF/test")).unwrap(), b"x");
/// fs.close();
/// ```
pub struct ArchiveFileSystem<'a> {
    archive: &'a Archive,
    spill: SpillCache,
}

impl<'a> ArchiveFileSystem<'a> {
    /// Mount `archive` with default spill settings.
    pub fn new(archive: &'a Archive) -> Self {
        Self::with_settings(archive, SpillSettings::default())
    }

    pub fn with_settings(archive: &'a Archive, settings: SpillSettings) -> Self {
        log::debug!("Mounting archive {}", archive.name());
        Self {
            archive,
            spill: SpillCache::new(settings),
        }
    }

    pub fn archive(&self) -> &'a Archive {
        self.archive
    }

    pub fn spill_cache(&self) -> &SpillCache {
        &self.spill
    }

    /// A handle on the root directory.
    pub fn root(&self) -> VirtualFile<'_> {
        VirtualFile::root(self)
    }
}

impl FileSystem for ArchiveFileSystem<'_> {
    fn metadata(&self, path: &ArchivePath) -> Result<Metadata> {
        match self.archive.get(path) {
            None => Err(FsError::NotFound(path.clone())),
            Some(Node::Directory(_)) => Ok(Metadata::directory()),
            Some(Node::Asset(asset)) => Ok(Metadata::file(asset.declared_len())),
        }
    }

    fn exists(&self, path: &ArchivePath) -> bool {
        self.archive.contains(path)
    }

    fn is_directory(&self, path: &ArchivePath) -> bool {
        matches!(self.archive.get(path), Some(Node::Directory(_)))
    }

    fn is_file(&self, path: &ArchivePath) -> bool {
        matches!(self.archive.get(path), Some(Node::Asset(_)))
    }

    fn list_children(&self, path: &ArchivePath) -> Result<Vec<ArchivePath>> {
        match self.archive.get(path) {
            None => Err(FsError::NotFound(path.clone())),
            Some(Node::Asset(_)) => Err(FsError::NotADirectory(path.clone())),
            Some(Node::Directory(dir)) => dir
                .names()
                .map(|name| {
                    path.child(name)
                        .map_err(|e| FsError::io(path, std::io::Error::other(e)))
                })
                .collect(),
        }
    }

    fn open_stream(&self, path: &ArchivePath) -> Result<AssetStream> {
        let asset = match self.archive.get(path) {
            None => return Err(FsError::NotFound(path.clone())),
            Some(Node::Directory(_)) => return Err(FsError::IsADirectory(path.clone())),
            Some(Node::Asset(asset)) => asset,
        };

        match asset.source() {
            AssetSource::Bytes(bytes) => Ok(AssetStream::from_bytes(bytes.clone())),
            AssetSource::File(host) => File::open(host)
                .map(AssetStream::File)
                .map_err(|e| FsError::io(path, e)),
            AssetSource::Generated(_) => self
                .spill
                .open(asset)
                .map(AssetStream::File)
                .map_err(|e| FsError::io(path, e)),
        }
    }

    fn close(&self) {
        if !self.spill.is_closed() {
            log::debug!("Closing mount of {}", self.archive.name());
        }
        self.spill.close();
    }
}
