//! The archive tree.

use std::fmt;
use std::sync::Arc;

use crate::asset::Asset;
use crate::error::{ArchiveError, Result};
use crate::node::{Directory, Node, NodeKind};
use crate::path::ArchivePath;
use crate::walk::Walk;

/// An in-memory, path-addressed collection of assets.
///
/// The archive owns its root directory; every node is owned by its parent.
/// Mutation needs `&mut self`, so anything holding a shared borrow (a walk,
/// a mounted filesystem view) sees a frozen tree.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::{archive_path, Archive, Asset};
///
/// let mut archive = Archive::new("test.jar");
/// archive.add_asset(&archive_path!("a/b/c.txt"), Asset::from_static(b"c")).unwrap();
///
/// assert!(archive.get(&archive_path!("a/b")).unwrap().is_directory());
/// assert!(archive.get(&archive_path!("a/b/c.txt")).unwrap().is_asset());
/// assert!(archive.get(&archive_path!("missing")).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Archive {
    name: String,
    root: Node,
}

impl Archive {
    /// Create an empty archive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Node::Directory(Directory::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root node. Always a directory.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Add an asset at `path`, creating intermediate directories.
    ///
    /// If an asset already lives at `path` it is replaced and returned: the
    /// last write wins. Fails with [`ArchiveError::PathConflict`] if a proper
    /// prefix of `path` is an asset, or if `path` itself is a directory.
    pub fn add_asset(&mut self, path: &ArchivePath, asset: Asset) -> Result<Option<Arc<Asset>>> {
        self.add_shared_asset(path, Arc::new(asset))
    }

    /// Like [`Archive::add_asset`], for an asset that may also live elsewhere.
    pub fn add_shared_asset(
        &mut self,
        path: &ArchivePath,
        asset: Arc<Asset>,
    ) -> Result<Option<Arc<Asset>>> {
        let (parent, name) = match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => return Err(ArchiveError::RootPath),
        };

        let dir = self.ensure_directory(&parent)?;
        match dir.children.get_mut(name) {
            Some(Node::Directory(_)) => Err(ArchiveError::PathConflict {
                path: path.clone(),
                existing: NodeKind::Directory,
            }),
            Some(slot) => {
                log::debug!("Overwriting asset at {}", path);
                let previous = std::mem::replace(slot, Node::Asset(asset));
                Ok(previous.as_asset().cloned())
            }
            None => {
                dir.children.insert(name.to_string(), Node::Asset(asset));
                Ok(None)
            }
        }
    }

    /// Ensure a directory exists at `path`. Idempotent.
    pub fn add_directory(&mut self, path: &ArchivePath) -> Result<()> {
        self.ensure_directory(path).map(|_| ())
    }

    /// The node at `path`, if any.
    pub fn get(&self, path: &ArchivePath) -> Option<&Node> {
        let mut current = &self.root;
        for segment in path.iter() {
            current = match current {
                Node::Directory(dir) => dir.children.get(segment)?,
                Node::Asset(_) => return None,
            };
        }
        Some(current)
    }

    pub fn contains(&self, path: &ArchivePath) -> bool {
        self.get(path).is_some()
    }

    /// Remove the subtree rooted at `path` and return it.
    ///
    /// Removing the root empties the archive. Absent paths are a no-op.
    pub fn remove(&mut self, path: &ArchivePath) -> Option<Node> {
        let (parent, name) = match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                let old = std::mem::replace(&mut self.root, Node::Directory(Directory::new()));
                return Some(old);
            }
        };

        let mut current = &mut self.root;
        for segment in parent.iter() {
            current = match current {
                Node::Directory(dir) => dir.children.get_mut(segment)?,
                Node::Asset(_) => return None,
            };
        }
        match current {
            Node::Directory(dir) => dir.children.shift_remove(name),
            Node::Asset(_) => None,
        }
    }

    /// Depth-first traversal of every node below the root.
    ///
    /// Directories are yielded before their descendants and siblings come in
    /// insertion order. Each call starts a fresh traversal.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.root)
    }

    /// Every asset leaf with its path, in walk order.
    pub fn assets(&self) -> impl Iterator<Item = (ArchivePath, &Arc<Asset>)> {
        self.walk()
            .filter_map(|(path, node)| node.as_asset().map(|asset| (path, asset)))
    }

    /// Graft the content of `other` under `at`.
    ///
    /// Assets are shared, not copied. Conflicts abort the merge with the
    /// nodes added so far left in place.
    pub fn merge(&mut self, other: &Archive, at: &ArchivePath) -> Result<()> {
        self.add_directory(at)?;
        for (path, node) in other.walk() {
            let target = at.join(&path);
            match node {
                Node::Directory(_) => self.add_directory(&target)?,
                Node::Asset(asset) => {
                    self.add_shared_asset(&target, Arc::clone(asset))?;
                }
            }
        }
        Ok(())
    }

    /// Resolve `path` to a directory, creating missing directories.
    ///
    /// The whole path is checked before anything is created, so a conflict
    /// leaves the tree untouched.
    fn ensure_directory(&mut self, path: &ArchivePath) -> Result<&mut Directory> {
        self.check_directory_path(path)?;

        let mut current = match &mut self.root {
            Node::Directory(dir) => dir,
            Node::Asset(_) => return Err(ArchiveError::RootPath),
        };
        for (depth, segment) in path.iter().enumerate() {
            let node = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Node::Directory(Directory::new()));
            current = match node {
                Node::Directory(dir) => dir,
                Node::Asset(_) => {
                    return Err(ArchiveError::PathConflict {
                        path: ArchivePath::try_from_segments(
                            path.segments()[..=depth].iter().cloned(),
                        )?,
                        existing: NodeKind::Asset,
                    })
                }
            };
        }
        Ok(current)
    }

    /// Fail if `path` or any of its ancestors is an asset.
    fn check_directory_path(&self, path: &ArchivePath) -> Result<()> {
        let mut dir = match &self.root {
            Node::Directory(dir) => dir,
            Node::Asset(_) => return Err(ArchiveError::RootPath),
        };
        for (depth, segment) in path.iter().enumerate() {
            match dir.children.get(segment) {
                Some(Node::Directory(child)) => dir = child,
                Some(Node::Asset(_)) => {
                    return Err(ArchiveError::PathConflict {
                        path: ArchivePath::try_from_segments(
                            path.segments()[..=depth].iter().cloned(),
                        )?,
                        existing: NodeKind::Asset,
                    })
                }
                None => return Ok(()),
            }
        }
        Ok(())
    }
}

impl fmt::Display for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "{}:", self.name)?;
            for (path, node) in self.walk() {
                match node {
                    Node::Directory(_) => writeln!(f, "{}/", path)?,
                    Node::Asset(_) => writeln!(f, "{}", path)?,
                }
            }
            Ok(())
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive_path;

    fn bytes_of(archive: &Archive, path: &str) -> Vec<u8> {
        archive
            .get(&archive_path!(path))
            .and_then(Node::as_asset)
            .unwrap()
            .read_all()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn new_archive_is_empty() {
        let archive = Archive::new("empty.jar");
        assert_eq!(archive.name(), "empty.jar");
        assert!(archive.root().is_directory());
        assert_eq!(archive.walk().count(), 0);
    }

    #[test]
    fn add_asset_creates_intermediate_directories() {
        let mut archive = Archive::new("t");
        archive
            .add_asset(&archive_path!("a/b/c"), Asset::from_static(b"c"))
            .unwrap();

        assert!(archive.get(&archive_path!("a")).unwrap().is_directory());
        assert!(archive.get(&archive_path!("a/b")).unwrap().is_directory());
        assert!(archive.get(&archive_path!("a/b/c")).unwrap().is_asset());
    }

    #[test]
    fn add_asset_at_root_rejected() {
        let mut archive = Archive::new("t");
        let err = archive
            .add_asset(&ArchivePath::root(), Asset::from_static(b"x"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::RootPath));
    }

    #[test]
    fn last_asset_write_wins() {
        let mut archive = Archive::new("t");
        let path = archive_path!("dir/file.txt");
        assert!(archive
            .add_asset(&path, Asset::from_static(b"first"))
            .unwrap()
            .is_none());
        let previous = archive
            .add_asset(&path, Asset::from_static(b"second"))
            .unwrap()
            .unwrap();

        assert_eq!(&previous.read_all().unwrap()[..], b"first");
        assert_eq!(bytes_of(&archive, "dir/file.txt"), b"second");
        assert_eq!(archive.assets().count(), 1);
    }

    #[test]
    fn overwrite_keeps_sibling_order() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("x"), Asset::from_static(b"1")).unwrap();
        archive.add_asset(&archive_path!("y"), Asset::from_static(b"2")).unwrap();
        archive.add_asset(&archive_path!("x"), Asset::from_static(b"3")).unwrap();

        let order: Vec<String> = archive.walk().map(|(p, _)| p.to_string()).collect();
        assert_eq!(order, vec!["/x", "/y"]);
    }

    #[test]
    fn asset_through_asset_prefix_conflicts() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a"), Asset::from_static(b"a")).unwrap();

        let err = archive
            .add_asset(&archive_path!("a/b/c"), Asset::from_static(b"c"))
            .unwrap_err();
        match err {
            ArchiveError::PathConflict { path, existing } => {
                assert_eq!(path, archive_path!("a"));
                assert_eq!(existing, NodeKind::Asset);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was created on the failed call.
        assert!(archive.get(&archive_path!("a")).unwrap().is_asset());
    }

    #[test]
    fn asset_over_directory_conflicts() {
        let mut archive = Archive::new("t");
        archive.add_directory(&archive_path!("a/b")).unwrap();
        let err = archive
            .add_asset(&archive_path!("a/b"), Asset::from_static(b"x"))
            .unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::PathConflict {
                existing: NodeKind::Directory,
                ..
            }
        ));
        assert!(archive.get(&archive_path!("a/b")).unwrap().is_directory());
    }

    #[test]
    fn directory_over_asset_conflicts() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a/b"), Asset::from_static(b"x")).unwrap();

        assert!(matches!(
            archive.add_directory(&archive_path!("a/b")),
            Err(ArchiveError::PathConflict { .. })
        ));
        assert!(matches!(
            archive.add_directory(&archive_path!("a/b/c")),
            Err(ArchiveError::PathConflict { .. })
        ));
    }

    #[test]
    fn add_directory_is_idempotent() {
        let mut archive = Archive::new("t");
        archive.add_directory(&archive_path!("a/b")).unwrap();
        archive.add_directory(&archive_path!("a/b")).unwrap();
        archive.add_directory(&ArchivePath::root()).unwrap();
        assert_eq!(archive.walk().count(), 2);
    }

    #[test]
    fn get_absent_is_none() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a"), Asset::from_static(b"a")).unwrap();
        assert!(archive.get(&archive_path!("b")).is_none());
        assert!(archive.get(&archive_path!("a/below/leaf")).is_none());
        assert!(archive.get(&ArchivePath::root()).is_some());
    }

    #[test]
    fn remove_subtree() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a/b/c"), Asset::from_static(b"c")).unwrap();
        archive.add_asset(&archive_path!("a/d"), Asset::from_static(b"d")).unwrap();
        archive.add_asset(&archive_path!("e"), Asset::from_static(b"e")).unwrap();

        let removed = archive.remove(&archive_path!("a/b")).unwrap();
        assert!(removed.is_directory());
        assert!(!archive.contains(&archive_path!("a/b")));
        assert!(!archive.contains(&archive_path!("a/b/c")));
        assert!(archive.contains(&archive_path!("a/d")));
        assert!(archive.contains(&archive_path!("e")));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a"), Asset::from_static(b"a")).unwrap();
        assert!(archive.remove(&archive_path!("nope")).is_none());
        assert!(archive.remove(&archive_path!("a/under/leaf")).is_none());
        assert_eq!(archive.walk().count(), 1);
    }

    #[test]
    fn remove_root_clears() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a/b"), Asset::from_static(b"b")).unwrap();
        archive.remove(&ArchivePath::root());
        assert_eq!(archive.walk().count(), 0);
        assert!(archive.root().is_directory());
    }

    #[test]
    fn walk_is_depth_first_in_insertion_order() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("z/1"), Asset::from_static(b"1")).unwrap();
        archive.add_asset(&archive_path!("a"), Asset::from_static(b"a")).unwrap();
        archive.add_asset(&archive_path!("z/0"), Asset::from_static(b"0")).unwrap();
        archive.add_directory(&archive_path!("m/empty")).unwrap();

        let order: Vec<String> = archive.walk().map(|(p, _)| p.to_string()).collect();
        assert_eq!(order, vec!["/z", "/z/1", "/z/0", "/a", "/m", "/m/empty"]);

        // Restartable: a second walk yields the same sequence.
        let again: Vec<String> = archive.walk().map(|(p, _)| p.to_string()).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn merge_grafts_and_shares_assets() {
        let mut lib = Archive::new("lib.jar");
        lib.add_asset(&archive_path!("org/Lib.class"), Asset::from_static(b"lib"))
            .unwrap();

        let mut app = Archive::new("app.war");
        app.merge(&lib, &archive_path!("WEB-INF/lib")).unwrap();

        let grafted = app
            .get(&archive_path!("WEB-INF/lib/org/Lib.class"))
            .and_then(Node::as_asset)
            .unwrap();
        let original = lib
            .get(&archive_path!("org/Lib.class"))
            .and_then(Node::as_asset)
            .unwrap();
        assert_eq!(grafted.id(), original.id());
    }

    #[test]
    fn verbose_display_lists_entries() {
        let mut archive = Archive::new("test.jar");
        archive.add_asset(&archive_path!("META-INF/test"), Asset::from_static(b"x")).unwrap();
        let listing = format!("{:#}", archive);
        assert!(listing.starts_with("test.jar:"));
        assert!(listing.contains("/META-INF/\n"));
        assert!(listing.contains("/META-INF/test\n"));
        assert_eq!(archive.to_string(), "test.jar");
    }
}
