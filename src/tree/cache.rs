//! The in-memory record tree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fqdn::DomainPath;
use crate::record::RecordEntry;

//------------ TreeCache -----------------------------------------------------

/// A hierarchical cache of record entries.
///
/// Every node holds child nodes keyed by path segment and record entries
/// keyed by leaf name. The type doubles as the whole tree and as a subtree
/// under construction: build a detached value, fill it, then graft it into
/// the shared tree with [`set_sub_cache`][Self::set_sub_cache].
///
/// All methods resolving a path walk it from this node downwards, so paths
/// are always relative to the node they are called on.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TreeCache {
    child_nodes: BTreeMap<String, TreeCache>,
    entries: BTreeMap<String, RecordEntry>,
}

impl TreeCache {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets an entry at the node addressed by `path`.
    ///
    /// Missing nodes along the path are created. An existing entry of the
    /// same name is replaced.
    pub fn set_entry(
        &mut self,
        key: &str,
        entry: RecordEntry,
        path: &DomainPath,
    ) {
        self.ensure_node(path).entries.insert(key.into(), entry);
    }

    /// Grafts `subtree` as the child `key` of the node addressed by `path`.
    ///
    /// Missing nodes along the path are created. A previous child of the
    /// same name is replaced wholesale, entries and descendants included.
    pub fn set_sub_cache(
        &mut self,
        key: &str,
        subtree: TreeCache,
        path: &DomainPath,
    ) {
        self.ensure_node(path).child_nodes.insert(key.into(), subtree);
    }

    /// Deletes whatever the last segment of `path` names.
    ///
    /// The path up to the last segment must address an existing node. The
    /// last segment is first tried as a child node, removing the node and
    /// everything below it, and then as an entry name. Returns whether
    /// something was removed. The empty path names no parent and removes
    /// nothing.
    pub fn delete_path(&mut self, path: &DomainPath) -> bool {
        let Some((last, parents)) = path.segments().split_last() else {
            return false;
        };
        let Some(node) = self.node_mut(parents) else {
            return false;
        };
        if node.child_nodes.remove(last).is_some() {
            return true;
        }
        node.entries.remove(last).is_some()
    }

    /// Returns the entry `key` at the node addressed by `path`.
    pub fn get_entry(
        &self,
        key: &str,
        path: &DomainPath,
    ) -> Option<&RecordEntry> {
        self.node(path.segments())?.entries.get(key)
    }

    /// Returns whether the tree holds neither entries nor children.
    pub fn is_empty(&self) -> bool {
        self.child_nodes.is_empty() && self.entries.is_empty()
    }

    /// Returns the number of entries in the whole tree.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
            + self
                .child_nodes
                .values()
                .map(TreeCache::entry_count)
                .sum::<usize>()
    }

    /// Visits every entry in the tree.
    ///
    /// The operation receives the path of the node holding the entry, the
    /// entry's name, and the entry itself. Entries of a node are visited
    /// before those of its children; both in name order.
    pub fn walk<Op>(&self, mut op: Op)
    where
        Op: FnMut(&DomainPath, &str, &RecordEntry),
    {
        let mut path = DomainPath::new();
        self.walk_node(&mut path, &mut op);
    }

    /// Serializes the whole tree into human-readable JSON.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    //--- Internal plumbing

    /// Returns the node addressed by `path`, creating missing nodes.
    fn ensure_node(&mut self, path: &DomainPath) -> &mut TreeCache {
        let mut node = self;
        for segment in path.segments() {
            node = node
                .child_nodes
                .entry(segment.clone())
                .or_default();
        }
        node
    }

    /// Returns the node addressed by `segments` if it exists.
    fn node(&self, segments: &[String]) -> Option<&TreeCache> {
        let mut node = self;
        for segment in segments {
            node = node.child_nodes.get(segment)?;
        }
        Some(node)
    }

    /// Returns the node addressed by `segments` mutably if it exists.
    fn node_mut(&mut self, segments: &[String]) -> Option<&mut TreeCache> {
        let mut node = self;
        for segment in segments {
            node = node.child_nodes.get_mut(segment)?;
        }
        Some(node)
    }

    fn walk_node<Op>(&self, path: &mut DomainPath, op: &mut Op)
    where
        Op: FnMut(&DomainPath, &str, &RecordEntry),
    {
        for (key, entry) in &self.entries {
            op(path, key, entry);
        }
        for (segment, child) in &self.child_nodes {
            path.push(segment.clone());
            child.walk_node(path, op);
            path.pop();
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fqdn::compose_fqdn;
    use crate::record::encode_target;

    fn mk_path(segments: &[&str]) -> DomainPath {
        DomainPath::from_segments(segments.iter().copied())
    }

    fn mk_entry(host: &str) -> RecordEntry {
        let (value, name) = encode_target(host, 0);
        RecordEntry::new(value, compose_fqdn(&["local", "cluster", &name]))
    }

    #[test]
    fn set_entry_creates_the_path() {
        let mut tree = TreeCache::new();
        let path = mk_path(&["local", "cluster", "svc", "prod"]);
        tree.set_entry("db", mk_entry("10.1.1.1"), &path);

        assert_eq!(tree.get_entry("db", &path), Some(&mk_entry("10.1.1.1")));
        assert_eq!(tree.get_entry("db", &mk_path(&["local"])), None);
        assert_eq!(tree.get_entry("web", &path), None);
    }

    #[test]
    fn set_entry_replaces_an_existing_entry() {
        let mut tree = TreeCache::new();
        let path = mk_path(&["local", "cluster"]);
        tree.set_entry("db", mk_entry("10.1.1.1"), &path);
        tree.set_entry("db", mk_entry("10.1.1.2"), &path);

        assert_eq!(tree.entry_count(), 1);
        assert_eq!(tree.get_entry("db", &path), Some(&mk_entry("10.1.1.2")));
    }

    #[test]
    fn grafting_replaces_a_subtree_wholesale() {
        let mut tree = TreeCache::new();
        let stack_path = mk_path(&["local", "cluster", "svc", "prod", "billing"]);
        let mut old = TreeCache::new();
        old.set_entry("stale", mk_entry("10.1.1.1"), &DomainPath::new());
        old.set_entry("gone", mk_entry("10.1.1.2"), &mk_path(&["deeper"]));
        tree.set_sub_cache("db", old, &stack_path);
        assert_eq!(tree.entry_count(), 2);

        let mut new = TreeCache::new();
        new.set_entry("fresh", mk_entry("10.1.1.3"), &DomainPath::new());
        tree.set_sub_cache("db", new, &stack_path);

        let db_path = mk_path(&[
            "local", "cluster", "svc", "prod", "billing", "db",
        ]);
        assert_eq!(tree.entry_count(), 1);
        assert_eq!(tree.get_entry("stale", &db_path), None);
        assert_eq!(
            tree.get_entry("fresh", &db_path),
            Some(&mk_entry("10.1.1.3"))
        );
    }

    #[test]
    fn delete_path_removes_a_whole_node() {
        let mut tree = TreeCache::new();
        let path = mk_path(&["local", "cluster", "svc", "prod", "billing"]);
        let mut subtree = TreeCache::new();
        subtree.set_entry("a", mk_entry("10.1.1.1"), &DomainPath::new());
        tree.set_sub_cache("db", subtree, &path);

        let mut target = path.clone();
        target.push("db");
        assert!(tree.delete_path(&target));
        assert!(!tree.delete_path(&target));
        assert_eq!(tree.entry_count(), 0);
    }

    #[test]
    fn delete_path_falls_back_to_an_entry() {
        // External name services store a bare entry, so the last path
        // segment may name an entry instead of a node.
        let mut tree = TreeCache::new();
        let path = mk_path(&["local", "cluster", "svc", "prod"]);
        tree.set_entry("db", mk_entry("db.example.com"), &path);

        let mut target = path.clone();
        target.push("db");
        assert!(tree.delete_path(&target));
        assert_eq!(tree.get_entry("db", &path), None);
    }

    #[test]
    fn delete_path_prefers_the_node_over_an_entry() {
        let mut tree = TreeCache::new();
        let path = mk_path(&["local", "cluster"]);
        tree.set_entry("db", mk_entry("10.1.1.1"), &path);
        tree.set_sub_cache("db", TreeCache::new(), &path);

        let mut target = path.clone();
        target.push("db");
        assert!(tree.delete_path(&target));
        // The node went first; the entry of the same name is still there.
        assert!(tree.get_entry("db", &path).is_some());
        assert!(tree.delete_path(&target));
        assert!(tree.get_entry("db", &path).is_none());
    }

    #[test]
    fn delete_path_rejects_the_empty_path() {
        let mut tree = TreeCache::new();
        tree.set_entry("db", mk_entry("10.1.1.1"), &mk_path(&["local"]));
        assert!(!tree.delete_path(&DomainPath::new()));
        assert_eq!(tree.entry_count(), 1);
    }

    #[test]
    fn delete_path_on_a_missing_parent_is_false() {
        let mut tree = TreeCache::new();
        assert!(!tree.delete_path(&mk_path(&["no", "such", "node"])));
    }

    #[test]
    fn walk_visits_every_entry_with_its_path() {
        let mut tree = TreeCache::new();
        tree.set_entry("root", mk_entry("10.0.0.1"), &DomainPath::new());
        tree.set_entry("db", mk_entry("10.1.1.1"), &mk_path(&["a", "b"]));
        tree.set_entry("web", mk_entry("10.1.1.2"), &mk_path(&["a"]));

        let mut seen = Vec::new();
        tree.walk(|path, key, entry| {
            seen.push((path.to_string(), key.to_string(), entry.clone()));
        });
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, "");
        assert_eq!(seen[0].1, "root");
        assert_eq!(seen[1].0, "a");
        assert_eq!(seen[1].1, "web");
        assert_eq!(seen[2].0, "a/b");
        assert_eq!(seen[2].1, "db");
    }

    #[test]
    fn serialize_produces_readable_json() {
        let mut tree = TreeCache::new();
        tree.set_entry("db", mk_entry("10.1.1.1"), &mk_path(&["local"]));
        let json = tree.serialize().unwrap();
        assert!(json.contains("\"local\""));
        assert!(json.contains("\"db\""));
        assert!(json.contains("\"10.1.1.1\""));
    }

    #[test]
    fn empty_trees_report_empty() {
        let mut tree = TreeCache::new();
        assert!(tree.is_empty());
        tree.set_sub_cache("a", TreeCache::new(), &DomainPath::new());
        assert!(!tree.is_empty());
        assert_eq!(tree.entry_count(), 0);
    }
}
