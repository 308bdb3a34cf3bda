//! Path handles bound to a filesystem.

use std::fmt;

use shrinkfs_archive::{ArchivePath, PathError};

use crate::error::Result;
use crate::filesystem::{FileSystem, Metadata};
use crate::stream::AssetStream;

/// A path inside a particular filesystem.
///
/// Handles are cheap to create and hold no resources; every query goes
/// through to the filesystem at call time.
#[derive(Clone)]
pub struct VirtualFile<'fs> {
    fs: &'fs dyn FileSystem,
    path: ArchivePath,
}

impl<'fs> VirtualFile<'fs> {
    pub fn root(fs: &'fs dyn FileSystem) -> Self {
        Self::new(fs, ArchivePath::root())
    }

    pub fn new(fs: &'fs dyn FileSystem, path: ArchivePath) -> Self {
        Self { fs, path }
    }

    /// Handle on the named entry below this one. The entry need not exist.
    pub fn child(&self, name: &str) -> std::result::Result<VirtualFile<'fs>, PathError> {
        Ok(Self::new(self.fs, self.path.child(name)?))
    }

    /// Resolve a relative path string against this handle.
    pub fn resolve(&self, relative: &str) -> std::result::Result<VirtualFile<'fs>, PathError> {
        let relative = ArchivePath::parse(relative)?;
        Ok(Self::new(self.fs, self.path.join(&relative)))
    }

    /// Handle on the containing directory; `None` at the root.
    pub fn parent(&self) -> Option<VirtualFile<'fs>> {
        self.path.parent().map(|p| Self::new(self.fs, p))
    }

    /// Final path segment; `None` at the root.
    pub fn name(&self) -> Option<&str> {
        self.path.name()
    }

    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    pub fn is_directory(&self) -> bool {
        self.fs.is_directory(&self.path)
    }

    pub fn is_file(&self) -> bool {
        self.fs.is_file(&self.path)
    }

    pub fn metadata(&self) -> Result<Metadata> {
        self.fs.metadata(&self.path)
    }

    pub fn children(&self) -> Result<Vec<VirtualFile<'fs>>> {
        Ok(self
            .fs
            .list_children(&self.path)?
            .into_iter()
            .map(|p| Self::new(self.fs, p))
            .collect())
    }

    pub fn open_stream(&self) -> Result<AssetStream> {
        self.fs.open_stream(&self.path)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.fs.read(&self.path)
    }
}

impl fmt::Debug for VirtualFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VirtualFile").field(&self.path).finish()
    }
}

impl fmt::Display for VirtualFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl PartialEq for VirtualFile<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.fs, other.fs) && self.path == other.path
    }
}
