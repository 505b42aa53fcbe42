//! Ordered byte store contract
//!
//! Any backend (in-memory, log-structured, B-tree) satisfies the same two
//! traits: a point-in-time [`SnapshotView`] and the [`StorageBackend`] that
//! produces snapshots and applies commit batches. The backend guarantees
//! only ordering and atomicity — durability is out of scope at this layer.

use crate::condition::Condition;
use crate::error::Result;
use crate::types::Entry;
use async_trait::async_trait;
use bytes::Bytes;

/// A consistent point-in-time view of committed state
///
/// A snapshot never shows writes committed after its version, uncommitted
/// writes from other transactions, or partial commit batches. Repeated
/// reads of the same key return the same value.
#[async_trait]
pub trait SnapshotView: Send + Sync {
    /// Point lookup
    async fn get(&self, key: &Bytes) -> Result<Option<Bytes>>;

    /// Range scan matching `condition`, ordered per its direction
    ///
    /// The result is finite and represents one pass; re-issue the scan to
    /// observe later state (through a newer snapshot).
    async fn scan(&self, condition: &Condition<Bytes>) -> Result<Vec<Entry>>;

    /// The committed version this snapshot was taken at
    fn version(&self) -> u64;
}

/// A batch of writes flushed atomically at commit
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// Keys to insert or overwrite
    pub puts: Vec<(Bytes, Bytes)>,
    /// Keys to remove
    pub deletes: Vec<Bytes>,
}

impl WriteBatch {
    /// True when the batch carries no operations
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    /// Every key the batch touches, puts and deletes alike
    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.puts.iter().map(|(k, _)| k).chain(self.deletes.iter())
    }
}

/// The physical ordered keyspace
///
/// Implementations must keep all keys under one global lexicographic order
/// and apply each [`WriteBatch`] as a single visible unit. Concurrency
/// control lives a layer above; callers serialize `apply` themselves.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Take a snapshot of the current committed state
    async fn snapshot(&self) -> Result<Box<dyn SnapshotView>>;

    /// Apply a commit batch atomically, returning the new committed version
    async fn apply(&self, batch: WriteBatch) -> Result<u64>;

    /// The current committed version
    fn current_version(&self) -> u64;
}
