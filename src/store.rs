//! Single-writer ownership of the record tree.
//!
//! The tree itself carries no locking. Instead, a dedicated task owns the
//! [`TreeCache`] exclusively and applies every write in arrival order. All
//! access goes through a [`StoreHandle`]: writes are fire and forget,
//! deletions and reads wait for the task's reply. Because the writer is
//! the only place where operations touch the tree, two operations can
//! never interleave and the last graft for a service simply wins.
//!
//! The task runs until the last handle is dropped. Joining the task after
//! that returns the final tree, which is mainly useful to tests and to
//! shutdown paths that want to persist a snapshot.

use core::fmt;
use std::error;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::fqdn::DomainPath;
use crate::record::RecordEntry;
use crate::tree::{RecordStore, StoreOp, TreeCache};

/// The length of the request queue towards the store task.
const REQUEST_QUEUE_LEN: usize = 64;

//------------ spawn ---------------------------------------------------------

/// Spawns the store task with `tree` as its initial content.
///
/// Returns the handle for talking to the task and the join handle that
/// yields the final tree once the task has stopped. Must be called from
/// within a Tokio runtime.
pub fn spawn(tree: TreeCache) -> (StoreHandle, JoinHandle<TreeCache>) {
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE_LEN);
    let task = tokio::spawn(run(tree, rx));
    (StoreHandle { tx }, task)
}

/// The store task itself.
async fn run(
    mut tree: TreeCache,
    mut rx: mpsc::Receiver<Request>,
) -> TreeCache {
    debug!("record store task running");
    while let Some(request) = rx.recv().await {
        match request {
            Request::Apply(op) => {
                tree.apply(op);
            }
            Request::DeletePath { path, reply } => {
                let removed = tree.delete_path(&path);
                let _ = reply.send(removed);
            }
            Request::GetEntry { key, path, reply } => {
                let entry = tree.get_entry(&key, &path).cloned();
                let _ = reply.send(entry);
            }
            Request::DumpJson { reply } => {
                let _ = reply.send(tree.serialize());
            }
        }
    }
    debug!("record store task stopped");
    tree
}

//------------ Request -------------------------------------------------------

/// A request sent from a handle to the store task.
enum Request {
    /// Apply a write; nobody waits for the outcome.
    Apply(StoreOp),

    /// Delete a path and report whether something was removed.
    DeletePath {
        path: DomainPath,
        reply: oneshot::Sender<bool>,
    },

    /// Look up a single entry.
    GetEntry {
        key: String,
        path: DomainPath,
        reply: oneshot::Sender<Option<RecordEntry>>,
    },

    /// Serialize the whole tree.
    DumpJson {
        reply: oneshot::Sender<Result<String, serde_json::Error>>,
    },
}

//------------ StoreHandle ---------------------------------------------------

/// Access to the record tree owned by the store task.
///
/// Handles are cheap to clone and may be used from any task. Every method
/// fails with [`StoreError::Closed`] once the store task is gone.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    tx: mpsc::Sender<Request>,
}

impl StoreHandle {
    /// Submits a prepared operation.
    ///
    /// The operation is applied in arrival order. The outcome of a
    /// [`StoreOp::DeletePath`] is dropped; use
    /// [`delete_path`][Self::delete_path] if you need it.
    pub async fn apply(&self, op: StoreOp) -> Result<(), StoreError> {
        self.send(Request::Apply(op)).await
    }

    /// Writes one entry at the node addressed by `path`.
    pub async fn set_entry(
        &self,
        key: &str,
        entry: RecordEntry,
        path: &DomainPath,
    ) -> Result<(), StoreError> {
        self.apply(StoreOp::SetEntry {
            key: key.into(),
            entry,
            path: path.clone(),
        })
        .await
    }

    /// Replaces the subtree `key` below the node addressed by `path`.
    pub async fn set_sub_cache(
        &self,
        key: &str,
        subtree: TreeCache,
        path: &DomainPath,
    ) -> Result<(), StoreError> {
        self.apply(StoreOp::SetSubCache {
            key: key.into(),
            subtree,
            path: path.clone(),
        })
        .await
    }

    /// Deletes the node or entry named by the last segment of `path`.
    ///
    /// Returns whether something was removed.
    pub async fn delete_path(
        &self,
        path: &DomainPath,
    ) -> Result<bool, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::DeletePath {
            path: path.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    /// Returns the entry `key` at the node addressed by `path`.
    pub async fn get_entry(
        &self,
        key: &str,
        path: &DomainPath,
    ) -> Result<Option<RecordEntry>, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::GetEntry {
            key: key.into(),
            path: path.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    /// Serializes the current tree into human-readable JSON.
    pub async fn dump_json(&self) -> Result<String, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::DumpJson { reply }).await?;
        rx.await.map_err(|_| StoreError::Closed)?.map_err(Into::into)
    }

    async fn send(&self, request: Request) -> Result<(), StoreError> {
        self.tx.send(request).await.map_err(|_| StoreError::Closed)
    }
}

//------------ StoreError ----------------------------------------------------

/// An error from talking to the store task.
#[derive(Debug)]
pub enum StoreError {
    /// The store task is gone.
    Closed,

    /// Serializing the tree failed.
    Serialize(serde_json::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Closed => {
                f.write_str("the record store task is gone")
            }
            StoreError::Serialize(err) => {
                write!(f, "serializing the record tree failed: {}", err)
            }
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            StoreError::Closed => None,
            StoreError::Serialize(err) => Some(err),
        }
    }
}

//============ Tests =========================================================
