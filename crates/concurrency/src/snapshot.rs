//! Live snapshot tracking
//!
//! The commit log can only be pruned past versions no open transaction
//! still needs. Every transaction registers its snapshot version here and
//! releases it on drop; the committer asks for the oldest live version
//! when deciding how far history may be trimmed.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Refcounted set of snapshot versions still held by open transactions
#[derive(Default)]
pub(crate) struct LiveSnapshots {
    versions: Mutex<BTreeMap<u64, usize>>,
}

impl LiveSnapshots {
    /// Register a snapshot; the returned guard releases it on drop
    pub(crate) fn register(self: &Arc<Self>, version: u64) -> SnapshotGuard {
        *self.versions.lock().entry(version).or_insert(0) += 1;
        SnapshotGuard {
            live: Arc::clone(self),
            version,
        }
    }

    fn release(&self, version: u64) {
        let mut versions = self.versions.lock();
        if let Some(count) = versions.get_mut(&version) {
            *count -= 1;
            if *count == 0 {
                versions.remove(&version);
            }
        }
    }

    /// The oldest snapshot version still live, if any
    pub(crate) fn oldest(&self) -> Option<u64> {
        self.versions.lock().keys().next().copied()
    }
}

/// Drop guard tying a transaction's lifetime to its snapshot registration
pub(crate) struct SnapshotGuard {
    live: Arc<LiveSnapshots>,
    version: u64,
}

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        self.live.release(self.version);
    }
}
