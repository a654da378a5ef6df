//! The hierarchical record cache.
//!
//! Records live in a tree of nodes keyed by path segment, with the entries
//! of a node keyed by leaf name. The shape mirrors the reversed DNS names
//! the records answer for: the cluster domain labels sit at the top,
//! namespaces below them, and a labeled service's records hang off its
//! stack node as one subtree.
//!
//! The module provides two things. [`TreeCache`] is the concrete in-memory
//! tree. It carries no locking; exclusive access is the caller's job, most
//! conveniently by handing the tree to the single writer task in the
//! [`store`][crate::store] module. [`RecordStore`] is the narrow write
//! contract the synthesis layer programs against, with [`StoreOp`] as its
//! message form: an operation can be prepared against private memory and
//! applied to shared state later, in one step.
//!
//! Subtrees are built in isolation as plain [`TreeCache`] values and then
//! grafted with [`RecordStore::set_sub_cache`], replacing whatever was in
//! place before. Reconciliation therefore never needs to diff: rebuilding
//! and re-grafting a service's subtree is idempotent.

mod cache;
mod traits;

pub use self::cache::TreeCache;
pub use self::traits::{RecordStore, StoreOp};
