//! Tree nodes: directories and asset leaves.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::asset::Asset;

/// The kind of a [`Node`], without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    Asset,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => f.write_str("directory"),
            NodeKind::Asset => f.write_str("asset"),
        }
    }
}

/// A node in an archive tree.
#[derive(Debug, Clone)]
pub enum Node {
    Directory(Directory),
    Asset(Arc<Asset>),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory(_) => NodeKind::Directory,
            Node::Asset(_) => NodeKind::Asset,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, Node::Asset(_))
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::Asset(_) => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Arc<Asset>> {
        match self {
            Node::Directory(_) => None,
            Node::Asset(asset) => Some(asset),
        }
    }
}

/// A directory node. Children iterate in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub(crate) children: IndexMap<String, Node>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a direct child by segment name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Child names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// `(name, node)` pairs in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let dir = Node::Directory(Directory::new());
        let leaf = Node::Asset(Arc::new(Asset::from_static(b"x")));
        assert_eq!(dir.kind(), NodeKind::Directory);
        assert_eq!(leaf.kind(), NodeKind::Asset);
        assert!(dir.as_directory().is_some());
        assert!(dir.as_asset().is_none());
        assert!(leaf.as_asset().is_some());
        assert!(leaf.as_directory().is_none());
    }

    #[test]
    fn kind_display() {
        assert_eq!(NodeKind::Directory.to_string(), "directory");
        assert_eq!(NodeKind::Asset.to_string(), "asset");
    }

    #[test]
    fn directory_keeps_insertion_order() {
        let mut dir = Directory::new();
        dir.children
            .insert("zeta".to_string(), Node::Directory(Directory::new()));
        dir.children
            .insert("alpha".to_string(), Node::Directory(Directory::new()));
        let names: Vec<&str> = dir.names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
