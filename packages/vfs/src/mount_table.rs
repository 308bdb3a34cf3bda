//! Several filesystems composed under one namespace.

use shrinkfs_archive::{ArchivePath, PathTrie};

use crate::error::{FsError, Result};
use crate::filesystem::{FileSystem, Metadata};
use crate::stream::AssetStream;

struct Mount<'a> {
    point: ArchivePath,
    fs: Box<dyn FileSystem + 'a>,
}

/// Routes each path to the filesystem mounted at its deepest covering
/// mount point.
///
/// Ancestors of a mount point read as directories even when nothing is
/// mounted above them, the same way an archive's intermediate directories
/// exist implicitly. Errors name the path the caller asked for, not the
/// path inside the routed filesystem.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::{archive_path, Archive, Asset};
/// use shrinkfs_vfs::{ArchiveFileSystem, FileSystem, MountTable};
///
/// let mut archive = Archive::new("lib.jar");
/// archive.add_asset(&archive_path!("a.txt"), Asset::from_static(b"a")).unwrap();
///
/// let mut table = MountTable::new();
/// table.mount(&archive_path!("deploy/lib"), ArchiveFileSystem::new(&archive)).unwrap();
///
/// assert!(table.is_directory(&archive_path!("deploy")));
/// assert_eq!(table.read(&archive_path!("deploy/lib/a.txt")).unwrap(), b"a");
/// ```
#[derive(Default)]
pub struct MountTable<'a> {
    mounts: PathTrie<Mount<'a>>,
}

impl<'a> MountTable<'a> {
    pub fn new() -> Self {
        Self {
            mounts: PathTrie::new(),
        }
    }

    /// Mount `fs` at `point`. Fails if something is already mounted there.
    pub fn mount<F>(&mut self, point: &ArchivePath, fs: F) -> Result<()>
    where
        F: FileSystem + 'a,
    {
        if self.mounts.get(point).is_some() {
            return Err(FsError::MountPointBusy(point.clone()));
        }
        log::debug!("Mounted filesystem at {}", point);
        self.mounts.insert(
            point,
            Mount {
                point: point.clone(),
                fs: Box::new(fs),
            },
        );
        Ok(())
    }

    /// Close and remove the filesystem mounted at `point`.
    pub fn unmount(&mut self, point: &ArchivePath) -> Result<()> {
        let mount = self
            .mounts
            .remove(point)
            .ok_or_else(|| FsError::NotFound(point.clone()))?;
        mount.fs.close();
        log::debug!("Unmounted filesystem at {}", point);
        Ok(())
    }

    /// All mount points, parents before children.
    pub fn mount_points(&self) -> Vec<ArchivePath> {
        self.mounts.iter().map(|(path, _)| path).collect()
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    fn route(&self, path: &ArchivePath) -> Option<(&Mount<'a>, ArchivePath)> {
        self.mounts.find_ancestor(path)
    }

    /// True if a mount point lies strictly below `path`.
    fn covers_mount(&self, path: &ArchivePath) -> bool {
        self.mounts.has_descendants(path)
    }
}

impl FileSystem for MountTable<'_> {
    fn metadata(&self, path: &ArchivePath) -> Result<Metadata> {
        if self.covers_mount(path) {
            return Ok(Metadata::directory());
        }
        match self.route(path) {
            Some((mount, inner)) => mount.fs.metadata(&inner).map_err(|e| e.at(path)),
            None => Err(FsError::NotFound(path.clone())),
        }
    }

    fn list_children(&self, path: &ArchivePath) -> Result<Vec<ArchivePath>> {
        let mut children = match self.route(path) {
            Some((mount, inner)) => match mount.fs.list_children(&inner) {
                Ok(listed) => listed
                    .iter()
                    .map(|child| mount.point.join(child))
                    .collect::<Vec<_>>(),
                Err(FsError::NotFound(_)) if self.covers_mount(path) => Vec::new(),
                Err(e) => return Err(e.at(path)),
            },
            None if self.covers_mount(path) => Vec::new(),
            None => return Err(FsError::NotFound(path.clone())),
        };

        for name in self.mounts.child_names(path) {
            let child = path
                .child(name)
                .map_err(|e| FsError::io(path, std::io::Error::other(e)))?;
            if !children.contains(&child) {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn open_stream(&self, path: &ArchivePath) -> Result<AssetStream> {
        if self.covers_mount(path) {
            return Err(FsError::IsADirectory(path.clone()));
        }
        match self.route(path) {
            Some((mount, inner)) => mount.fs.open_stream(&inner).map_err(|e| e.at(path)),
            None => Err(FsError::NotFound(path.clone())),
        }
    }

    fn close(&self) {
        for (_, mount) in self.mounts.iter() {
            mount.fs.close();
        }
    }
}
