//! Transaction context
//!
//! A [`Transaction`] is one unit of work: a snapshot of committed state, a
//! local write-set, and a record of everything it read. Reads check the
//! write-set first (read-your-own-writes) and only fall through to the
//! snapshot; writes never touch the snapshot until commit.
//!
//! # Read-set tracking
//!
//! - `get` records the key into the point read-set — unless the write-set
//!   already shadows it, in which case nothing outside this transaction
//!   was observed.
//! - `query` records the *condition itself*, not the keys it happened to
//!   yield. A write landing inside the range after the scan ran but before
//!   this transaction commits must still be detected (phantom prevention).
//! - `put`/`delete` record nothing: two transactions that blindly write
//!   the same key do not conflict (last committer wins).

use crate::snapshot::SnapshotGuard;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use quill_core::{Condition, Direction, Entry, Error, Result, SnapshotView, WriteBatch};
use std::collections::{BTreeMap, HashSet};

/// A buffered mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Write {
    Put(Bytes),
    /// Key deleted within this transaction, not yet reflected anywhere else
    Tombstone,
}

/// Everything a transaction observed from its snapshot
#[derive(Debug, Default)]
pub(crate) struct ReadSet {
    pub points: HashSet<Bytes>,
    pub ranges: Vec<Condition<Bytes>>,
}

/// Finite, ordered stream of scan results
///
/// One pass over the state as of the call; re-issue the query to rescan.
pub type QueryStream = BoxStream<'static, Result<Entry>>;

/// The unit of work against one store
pub struct Transaction {
    snapshot: Box<dyn SnapshotView>,
    write_set: BTreeMap<Bytes, Write>,
    reads: ReadSet,
    read_only: bool,
    _guard: SnapshotGuard,
}

impl Transaction {
    pub(crate) fn new(snapshot: Box<dyn SnapshotView>, read_only: bool, guard: SnapshotGuard) -> Self {
        Transaction {
            snapshot,
            write_set: BTreeMap::new(),
            reads: ReadSet::default(),
            read_only,
            _guard: guard,
        }
    }

    /// The committed version this transaction's snapshot was taken at
    pub fn snapshot_version(&self) -> u64 {
        self.snapshot.version()
    }

    /// Point read with read-your-own-writes
    pub async fn get(&mut self, key: &Bytes) -> Result<Option<Bytes>> {
        if let Some(write) = self.write_set.get(key) {
            return Ok(match write {
                Write::Put(value) => Some(value.clone()),
                Write::Tombstone => None,
            });
        }
        tracing::trace!(key = ?key, "recorded point read");
        self.reads.points.insert(key.clone());
        self.snapshot.get(key).await
    }

    /// Buffer an insert or overwrite
    ///
    /// Shadows the snapshot for this transaction's later reads; invisible
    /// to everyone else until commit.
    pub fn put(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Result<()> {
        self.ensure_writable()?;
        self.write_set.insert(key.into(), Write::Put(value.into()));
        Ok(())
    }

    /// Buffer a delete as a tombstone
    pub fn delete(&mut self, key: impl Into<Bytes>) -> Result<()> {
        self.ensure_writable()?;
        self.write_set.insert(key.into(), Write::Tombstone);
        Ok(())
    }

    /// Range scan merging the write-set over the snapshot
    ///
    /// Write-set entries satisfying the condition shadow snapshot entries
    /// by key; tombstoned keys are dropped. Results follow the condition's
    /// direction: ascending for gt/gte, descending for lt/lte.
    pub async fn query(&mut self, condition: &Condition<Bytes>) -> Result<QueryStream> {
        tracing::trace!(?condition, "recorded range read");
        self.reads.ranges.push(condition.clone());
        let scanned = self.snapshot.scan(condition).await?;

        let mut merged: BTreeMap<Bytes, Bytes> =
            scanned.into_iter().map(|e| (e.key, e.value)).collect();
        for (key, write) in self.write_set.iter().filter(|(k, _)| condition.admits(k)) {
            match write {
                Write::Put(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Write::Tombstone => {
                    merged.remove(key);
                }
            }
        }

        let mut entries: Vec<Entry> = merged.into_iter().map(|(k, v)| Entry::new(k, v)).collect();
        if condition.direction() == Direction::Descending {
            entries.reverse();
        }
        Ok(Box::pin(stream::iter(entries.into_iter().map(Ok))))
    }

    /// True when this transaction was opened read-only and rejects writes
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// True when no writes are buffered
    ///
    /// Distinct from [`Transaction::is_read_only`]: a writable
    /// transaction that never wrote also commits without validation.
    pub fn has_no_writes(&self) -> bool {
        self.write_set.is_empty()
    }

    pub(crate) fn reads(&self) -> &ReadSet {
        &self.reads
    }

    pub(crate) fn into_batch(self) -> WriteBatch {
        let mut batch = WriteBatch::default();
        for (key, write) in self.write_set {
            match write {
                Write::Put(value) => batch.puts.push((key, value)),
                Write::Tombstone => batch.deletes.push(key),
            }
        }
        batch
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            Err(Error::InvalidOperation(
                "write attempted in a read-only snapshot".into(),
            ))
        } else {
            Ok(())
        }
    }
}
