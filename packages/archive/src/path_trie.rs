//! A generic prefix trie keyed by archive path segments.
//!
//! Used for routing: given a set of values registered at paths (mount
//! points, overrides), find the deepest one that covers a request path.

use std::collections::BTreeMap;

use crate::ArchivePath;

/// A prefix trie keyed by path segments.
///
/// Each node can optionally hold a value of type T. Operations are O(k)
/// where k is the path depth.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::{archive_path, PathTrie};
///
/// let mut trie: PathTrie<&str> = PathTrie::new();
/// trie.insert(&archive_path!("mnt"), "outer");
/// trie.insert(&archive_path!("mnt/inner"), "inner");
///
/// let (value, suffix) = trie.find_ancestor(&archive_path!("mnt/inner/a/b")).unwrap();
/// assert_eq!(*value, "inner");
/// assert_eq!(suffix, archive_path!("a/b"));
/// ```
#[derive(Debug, Clone)]
pub struct PathTrie<T> {
    value: Option<T>,
    children: BTreeMap<String, PathTrie<T>>,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

impl<T> PathTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, path: &ArchivePath) -> Option<&PathTrie<T>> {
        let mut current = self;
        for segment in path.iter() {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &ArchivePath) -> Option<&mut PathTrie<T>> {
        let mut current = self;
        for segment in path.iter() {
            current = current.children.get_mut(segment)?;
        }
        Some(current)
    }

    /// Insert a value at path. Returns previous value if any.
    pub fn insert(&mut self, path: &ArchivePath, value: T) -> Option<T> {
        let mut current = self;
        for segment in path.iter() {
            current = current.children.entry(segment.to_string()).or_default();
        }
        current.value.replace(value)
    }

    /// Remove and return the value at exact path, pruning empty branches.
    pub fn remove(&mut self, path: &ArchivePath) -> Option<T> {
        let removed = self.node_mut(path)?.value.take();
        if removed.is_some() {
            self.prune(path.segments());
        }
        removed
    }

    /// Drop childless, valueless nodes along `segments`. Returns true if
    /// `self` became empty.
    fn prune(&mut self, segments: &[String]) -> bool {
        if let Some((first, rest)) = segments.split_first() {
            let child_empty = self
                .children
                .get_mut(first)
                .is_some_and(|child| child.prune(rest));
            if child_empty {
                self.children.remove(first);
            }
        }
        self.value.is_none() && self.children.is_empty()
    }

    /// Get reference to value at exact path.
    pub fn get(&self, path: &ArchivePath) -> Option<&T> {
        self.node(path)?.value.as_ref()
    }

    pub fn get_mut(&mut self, path: &ArchivePath) -> Option<&mut T> {
        self.node_mut(path)?.value.as_mut()
    }

    /// True if some value lives strictly below `path`.
    pub fn has_descendants(&self, path: &ArchivePath) -> bool {
        self.node(path)
            .is_some_and(|node| node.children.values().any(|c| !c.is_empty()))
    }

    /// Names of the child branches directly below `path` that lead to values.
    pub fn child_names(&self, path: &ArchivePath) -> Vec<&str> {
        self.node(path)
            .map(|node| {
                node.children
                    .iter()
                    .filter(|(_, child)| !child.is_empty())
                    .map(|(name, _)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count of values in trie (not nodes).
    pub fn len(&self) -> usize {
        usize::from(self.value.is_some())
            + self.children.values().map(PathTrie::len).sum::<usize>()
    }

    /// True if no values anywhere in trie.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.values().all(PathTrie::is_empty)
    }

    /// Find the deepest ancestor (or the path itself) holding a value.
    /// Returns (value_ref, remaining_suffix).
    pub fn find_ancestor(&self, path: &ArchivePath) -> Option<(&T, ArchivePath)> {
        let mut current = self;
        let mut last = self.value.as_ref().map(|v| (v, 0));

        for (depth, segment) in path.iter().enumerate() {
            match current.children.get(segment) {
                Some(child) => {
                    current = child;
                    if let Some(value) = child.value.as_ref() {
                        last = Some((value, depth + 1));
                    }
                }
                None => break,
            }
        }

        let (value, depth) = last?;
        let prefix = path.segments()[..depth].to_vec();
        let prefix = ArchivePath::try_from_segments(prefix).ok()?;
        path.strip_prefix(&prefix).map(|suffix| (value, suffix))
    }

    /// Iterate over all (path, value) pairs, parents before children.
    pub fn iter(&self) -> PathTrieIter<'_, T> {
        PathTrieIter {
            stack: vec![(ArchivePath::root(), self)],
        }
    }
}

/// Iterator over (ArchivePath, &T) pairs in a PathTrie.
pub struct PathTrieIter<'a, T> {
    stack: Vec<(ArchivePath, &'a PathTrie<T>)>,
}

impl<'a, T> Iterator for PathTrieIter<'a, T> {
    type Item = (ArchivePath, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            for (name, child) in node.children.iter().rev() {
                if let Ok(child_path) = path.child(name) {
                    self.stack.push((child_path, child));
                }
            }
            if let Some(value) = node.value.as_ref() {
                return Some((path, value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive_path;

    #[test]
    fn new_trie_is_empty() {
        let trie: PathTrie<i32> = PathTrie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.len(), 0);
    }

    #[test]
    fn insert_and_get() {
        let mut trie = PathTrie::new();
        trie.insert(&archive_path!("a/b"), 42);

        assert_eq!(trie.get(&archive_path!("a/b")), Some(&42));
        assert_eq!(trie.get(&archive_path!("a")), None);
        assert_eq!(trie.get(&archive_path!("a/b/c")), None);
    }

    #[test]
    fn insert_returns_previous() {
        let mut trie = PathTrie::new();
        assert_eq!(trie.insert(&archive_path!("a"), 1), None);
        assert_eq!(trie.insert(&archive_path!("a"), 2), Some(1));
        assert_eq!(trie.get(&archive_path!("a")), Some(&2));
    }

    #[test]
    fn remove_prunes_branch() {
        let mut trie = PathTrie::new();
        trie.insert(&archive_path!("a/b/c"), 1);
        trie.insert(&archive_path!("x"), 2);

        assert_eq!(trie.remove(&archive_path!("a/b/c")), Some(1));
        assert!(!trie.has_descendants(&archive_path!("a")));
        assert_eq!(trie.child_names(&ArchivePath::root()), vec!["x"]);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn remove_keeps_children() {
        let mut trie = PathTrie::new();
        trie.insert(&archive_path!("a"), 1);
        trie.insert(&archive_path!("a/b"), 2);

        trie.remove(&archive_path!("a"));

        assert_eq!(trie.get(&archive_path!("a")), None);
        assert_eq!(trie.get(&archive_path!("a/b")), Some(&2));
    }

    #[test]
    fn find_ancestor_picks_deepest() {
        let mut trie = PathTrie::new();
        trie.insert(&archive_path!("a"), 1);
        trie.insert(&archive_path!("a/b/c"), 2);

        let (v, suffix) = trie.find_ancestor(&archive_path!("a/b/c/d")).unwrap();
        assert_eq!(*v, 2);
        assert_eq!(suffix, archive_path!("d"));

        let (v, suffix) = trie.find_ancestor(&archive_path!("a/b")).unwrap();
        assert_eq!(*v, 1);
        assert_eq!(suffix, archive_path!("b"));

        let (v, suffix) = trie.find_ancestor(&archive_path!("a/b/c")).unwrap();
        assert_eq!(*v, 2);
        assert!(suffix.is_root());

        assert!(trie.find_ancestor(&archive_path!("z")).is_none());
    }

    #[test]
    fn find_ancestor_uses_root_value() {
        let mut trie = PathTrie::new();
        trie.insert(&ArchivePath::root(), 0);
        let (v, suffix) = trie.find_ancestor(&archive_path!("x/y")).unwrap();
        assert_eq!(*v, 0);
        assert_eq!(suffix, archive_path!("x/y"));
    }

    #[test]
    fn iter_parents_first() {
        let mut trie = PathTrie::new();
        trie.insert(&archive_path!("b"), 2);
        trie.insert(&archive_path!("a/x"), 1);
        trie.insert(&archive_path!("a"), 0);

        let items: Vec<(String, i32)> = trie.iter().map(|(p, v)| (p.to_string(), *v)).collect();
        assert_eq!(
            items,
            vec![
                ("/a".to_string(), 0),
                ("/a/x".to_string(), 1),
                ("/b".to_string(), 2)
            ]
        );
    }
}
