//! The write contract of the record tree.

use crate::fqdn::DomainPath;
use crate::record::RecordEntry;

use super::TreeCache;

//------------ RecordStore ---------------------------------------------------

/// The operations record synthesis needs from the shared namespace.
///
/// [`TreeCache`] implements the trait directly; anything wrapping the tree
/// in other storage only needs these three primitives. All of them take
/// `&mut self`: writers are serialized by exclusive access, never by
/// locking inside the store.
pub trait RecordStore {
    /// Writes one entry at the node addressed by `path`.
    ///
    /// Missing nodes along the path are created; an entry of the same name
    /// is replaced.
    fn set_entry(&mut self, key: &str, entry: RecordEntry, path: &DomainPath);

    /// Replaces the subtree `key` below the node addressed by `path`.
    ///
    /// Whatever child of that name existed before is dropped wholesale.
    fn set_sub_cache(
        &mut self,
        key: &str,
        subtree: TreeCache,
        path: &DomainPath,
    );

    /// Deletes the node or entry named by the last segment of `path`.
    ///
    /// Returns whether something was removed.
    fn delete_path(&mut self, path: &DomainPath) -> bool;

    /// Applies a prepared operation.
    ///
    /// Returns the deletion outcome for [`StoreOp::DeletePath`] and `true`
    /// for the unconditional writes.
    fn apply(&mut self, op: StoreOp) -> bool {
        match op {
            StoreOp::SetEntry { key, entry, path } => {
                self.set_entry(&key, entry, &path);
                true
            }
            StoreOp::SetSubCache { key, subtree, path } => {
                self.set_sub_cache(&key, subtree, &path);
                true
            }
            StoreOp::DeletePath { path } => self.delete_path(&path),
        }
    }
}

impl RecordStore for TreeCache {
    fn set_entry(
        &mut self,
        key: &str,
        entry: RecordEntry,
        path: &DomainPath,
    ) {
        TreeCache::set_entry(self, key, entry, path)
    }

    fn set_sub_cache(
        &mut self,
        key: &str,
        subtree: TreeCache,
        path: &DomainPath,
    ) {
        TreeCache::set_sub_cache(self, key, subtree, path)
    }

    fn delete_path(&mut self, path: &DomainPath) -> bool {
        TreeCache::delete_path(self, path)
    }
}

//------------ StoreOp -------------------------------------------------------

/// One write against the shared namespace.
///
/// Operations are prepared against private memory by the synthesis layer
/// and applied to shared state in a single step, either directly through
/// [`RecordStore::apply`] or by sending them to the store task. The
/// variants mirror the trait methods.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreOp {
    /// Write one entry, creating its path as needed.
    SetEntry {
        /// The entry's name within its node.
        key: String,
        /// The entry itself.
        entry: RecordEntry,
        /// The node to write into.
        path: DomainPath,
    },

    /// Replace a whole subtree.
    SetSubCache {
        /// The subtree's name below its parent.
        key: String,
        /// The replacement subtree.
        subtree: TreeCache,
        /// The parent node.
        path: DomainPath,
    },

    /// Delete the node or entry the path's last segment names.
    DeletePath {
        /// The path to delete.
        path: DomainPath,
    },
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fqdn::compose_fqdn;
    use crate::record::encode_target;

    fn mk_entry(host: &str) -> RecordEntry {
        let (value, name) = encode_target(host, 0);
        RecordEntry::new(value, compose_fqdn(&["local", "cluster", &name]))
    }

    #[test]
    fn apply_routes_every_variant() {
        let mut tree = TreeCache::new();
        let path = DomainPath::from_segments(["local", "cluster", "svc"]);

        assert!(tree.apply(StoreOp::SetEntry {
            key: "db".into(),
            entry: mk_entry("db.example.com"),
            path: path.clone(),
        }));
        assert!(tree.get_entry("db", &path).is_some());

        let mut subtree = TreeCache::new();
        subtree.set_entry("a", mk_entry("10.1.1.1"), &DomainPath::new());
        assert!(tree.apply(StoreOp::SetSubCache {
            key: "billing".into(),
            subtree,
            path: path.clone(),
        }));
        assert_eq!(tree.entry_count(), 2);

        let mut target = path.clone();
        target.push("billing");
        assert!(tree.apply(StoreOp::DeletePath {
            path: target.clone()
        }));
        assert!(!tree.apply(StoreOp::DeletePath { path: target }));
    }
}
