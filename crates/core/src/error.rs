//! Error types for quillstore
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Propagation policy: `Conflict` is the only recoverable kind — the retry
//! driver re-runs the transaction body on it. Every other kind aborts the
//! in-flight transaction immediately and discards its write-set.

use crate::condition::Condition;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Result type alias for quillstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// How a conflicting key was observed by the losing transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadKind {
    /// The key itself was read with a point `get`
    Point,
    /// The key fell inside a recorded range condition
    Range(Condition<Bytes>),
}

/// Detail for a single failed commit attempt
///
/// Names the committed write that invalidated one of the transaction's
/// recorded reads, and which read observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    /// Key written by a transaction that committed after our snapshot
    pub key: Bytes,
    /// Commit version of the conflicting write
    pub version: u64,
    /// The read that the write invalidated
    pub read: ReadKind,
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.read {
            ReadKind::Point => write!(
                f,
                "key {:?} (committed at version {}) invalidated a point read",
                self.key, self.version
            ),
            ReadKind::Range(condition) => write!(
                f,
                "key {:?} (committed at version {}) landed inside a scanned range {:?}",
                self.key, self.version, condition
            ),
        }
    }
}

/// Error types for quillstore
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A single commit attempt lost a race with another committer
    ///
    /// Never surfaced alone by `Store::transact`: the retry driver either
    /// recovers from it or bundles every attempt into `RetriesExhausted`.
    #[error("transaction conflict: {0}")]
    Conflict(ConflictInfo),

    /// Every commit attempt conflicted and the retry budget is spent
    #[error("conflict retries exhausted after {} attempt(s)", attempts.len())]
    RetriesExhausted {
        /// Conflict detail from each failed attempt, in order
        attempts: Vec<ConflictInfo>,
    },

    /// A unique index already holds an entry for the computed key
    ///
    /// A structural error, not a concurrency conflict: it is never retried.
    #[error("unique index violation on '{index}'")]
    UniqueViolation {
        /// Name of the offending index
        index: String,
    },

    /// A condition record had zero or more than one bound set
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// Caller referenced a document id that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Index sync was handed prev/next documents with different ids
    #[error("index '{index}': documents have different ids")]
    IdMismatch {
        /// Name of the index whose sync call failed
        index: String,
    },

    /// Operation not permitted in the current transaction state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Key or value bytes could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),

    /// Backing store failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// True for per-attempt commit conflicts (the only retryable kind)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
