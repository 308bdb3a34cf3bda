//! Depth-first traversal of an archive tree.

use crate::node::Node;
use crate::path::ArchivePath;

/// Iterator over `(ArchivePath, &Node)` pairs below a root node.
///
/// Pre-order: a directory is yielded before its children, siblings in
/// insertion order. The root itself is not yielded.
pub struct Walk<'a> {
    stack: Vec<(ArchivePath, &'a Node)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_children(&ArchivePath::root(), root);
        walk
    }

    fn push_children(&mut self, path: &ArchivePath, node: &'a Node) {
        if let Node::Directory(dir) = node {
            // Reverse so the first-inserted child is popped first.
            for (name, child) in dir.iter().rev() {
                let mut segments = path.segments().to_vec();
                segments.push(name.to_string());
                // Names come from a tree whose keys were validated on insert.
                if let Ok(child_path) = ArchivePath::try_from_segments(segments) {
                    self.stack.push((child_path, child));
                }
            }
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (ArchivePath, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        self.push_children(&path, node);
        Some((path, node))
    }
}
