//! In-memory ordered byte store
//!
//! The committed keyspace is a persistent-by-swap `BTreeMap`: the live map
//! sits behind an `Arc`, snapshots clone the `Arc` (O(1)), and each commit
//! batch builds a modified copy and swaps it in together with a version
//! bump. Readers holding older `Arc`s keep their point-in-time view for
//! free, which is what gives transactions snapshot isolation.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use quill_core::{Condition, Direction, Entry, Result, SnapshotView, StorageBackend, WriteBatch};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Keyspace = BTreeMap<Bytes, Bytes>;

/// In-memory [`StorageBackend`]
///
/// Versions start at 0 for an empty store and increase by one per applied
/// batch. `apply` is not internally serialized against itself; the commit
/// layer above holds its commit lock across the call.
pub struct MemoryBackend {
    data: RwLock<Arc<Keyspace>>,
    version: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty store at version 0
    pub fn new() -> Self {
        MemoryBackend {
            data: RwLock::new(Arc::new(BTreeMap::new())),
            version: AtomicU64::new(0),
        }
    }

    /// Number of live keys (for tests and diagnostics)
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when no keys are committed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn snapshot(&self) -> Result<Box<dyn SnapshotView>> {
        let data = Arc::clone(&self.data.read());
        let version = self.version.load(Ordering::SeqCst);
        Ok(Box::new(MemorySnapshot { data, version }))
    }

    async fn apply(&self, batch: WriteBatch) -> Result<u64> {
        let mut guard = self.data.write();
        let mut next = (**guard).clone();
        for (key, value) in batch.puts {
            next.insert(key, value);
        }
        for key in &batch.deletes {
            next.remove(key);
        }
        *guard = Arc::new(next);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(version, "applied commit batch");
        Ok(version)
    }

    fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

/// Snapshot over an `Arc`-shared map
struct MemorySnapshot {
    data: Arc<Keyspace>,
    version: u64,
}

#[async_trait]
impl SnapshotView for MemorySnapshot {
    async fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        Ok(self.data.get(key).cloned())
    }

    async fn scan(&self, condition: &Condition<Bytes>) -> Result<Vec<Entry>> {
        Ok(scan_map(&self.data, condition))
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Range-scan an ordered map under a one-sided condition.
///
/// gt/gte walk ascending from the bound; lt/lte walk descending toward it,
/// highest key first. Bound inclusion follows the condition exactly.
pub(crate) fn scan_map(map: &Keyspace, condition: &Condition<Bytes>) -> Vec<Entry> {
    let range: (Bound<&Bytes>, Bound<&Bytes>) = match condition {
        Condition::Gt(k) => (Bound::Excluded(k), Bound::Unbounded),
        Condition::Gte(k) => (Bound::Included(k), Bound::Unbounded),
        Condition::Lt(k) => (Bound::Unbounded, Bound::Excluded(k)),
        Condition::Lte(k) => (Bound::Unbounded, Bound::Included(k)),
    };
    let entries = map.range::<Bytes, _>(range).map(|(k, v)| Entry::new(k.clone(), v.clone()));
    match condition.direction() {
        Direction::Ascending => entries.collect(),
        Direction::Descending => {
            let mut out: Vec<Entry> = entries.collect();
            out.reverse();
            out
        }
    }
}
