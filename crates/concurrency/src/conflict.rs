//! Commit-time conflict detection
//!
//! The store keeps a log of which keys each committed transaction wrote,
//! tagged with the commit version. Validating a transaction with snapshot
//! version S means checking its recorded reads against every key written
//! at a version greater than S:
//!
//! - a point read conflicts when the key itself was written;
//! - a range read conflicts when any written key satisfies the recorded
//!   condition, under the same boundary semantics as the scan (`gt`
//!   excludes the bound, `gte` includes it, and likewise for the
//!   descending pair).
//!
//! A transaction's own writes never appear in the log until after its
//! check passes, so self-conflict is impossible by construction. Records
//! at or below the oldest live snapshot can never matter again and are
//! pruned after each commit.

use crate::transaction::ReadSet;
use bytes::Bytes;
use quill_core::{ConflictInfo, ReadKind};
use std::collections::VecDeque;

/// One committed transaction's write footprint
#[derive(Debug, Clone)]
pub(crate) struct CommitRecord {
    pub version: u64,
    pub keys: Vec<Bytes>,
}

/// Ordered history of committed write footprints
#[derive(Debug, Default)]
pub(crate) struct CommitLog {
    records: VecDeque<CommitRecord>,
}

impl CommitLog {
    /// Append a committed footprint; versions must arrive increasing
    pub(crate) fn append(&mut self, record: CommitRecord) {
        debug_assert!(self
            .records
            .back()
            .map_or(true, |last| last.version < record.version));
        self.records.push_back(record);
    }

    /// Drop every record at or below `version`
    pub(crate) fn prune_through(&mut self, version: u64) {
        while self
            .records
            .front()
            .map_or(false, |r| r.version <= version)
        {
            self.records.pop_front();
        }
    }

    /// First read invalidated by a write committed after `snapshot_version`
    pub(crate) fn find_conflict(
        &self,
        reads: &ReadSet,
        snapshot_version: u64,
    ) -> Option<ConflictInfo> {
        let start = self
            .records
            .partition_point(|r| r.version <= snapshot_version);
        for record in self.records.iter().skip(start) {
            for key in &record.keys {
                if reads.points.contains(key) {
                    return Some(ConflictInfo {
                        key: key.clone(),
                        version: record.version,
                        read: ReadKind::Point,
                    });
                }
                if let Some(condition) = reads.ranges.iter().find(|c| c.admits(key)) {
                    return Some(ConflictInfo {
                        key: key.clone(),
                        version: record.version,
                        read: ReadKind::Range(condition.clone()),
                    });
                }
            }
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
