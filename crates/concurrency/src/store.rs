//! The transactional store facade
//!
//! [`Store`] owns a storage backend, the commit log, and the single commit
//! lock. Transaction bodies run fully concurrently against their own
//! snapshots; only the validate-and-flush step in [`Store::commit`] is
//! serialized. The store is cheap to clone and every clone shares the same
//! state.

use crate::conflict::{CommitLog, CommitRecord};
use crate::retry::{self, RetryPolicy};
use crate::snapshot::LiveSnapshots;
use crate::transaction::Transaction;
use futures::future::BoxFuture;
use quill_core::{Error, Result, StorageBackend};
use quill_storage::MemoryBackend;
use std::sync::Arc;

struct StoreInner {
    backend: Box<dyn StorageBackend>,
    commit_lock: tokio::sync::Mutex<()>,
    log: parking_lot::Mutex<CommitLog>,
    live: Arc<LiveSnapshots>,
    policy: RetryPolicy,
}

/// Handle to one transactional store; clones share state
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Open a store over the given backend with the default retry policy
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_policy(backend, RetryPolicy::default())
    }

    /// Open a store with an explicit retry policy
    pub fn with_policy(backend: impl StorageBackend + 'static, policy: RetryPolicy) -> Self {
        Store {
            inner: Arc::new(StoreInner {
                backend: Box::new(backend),
                commit_lock: tokio::sync::Mutex::new(()),
                log: parking_lot::Mutex::new(CommitLog::default()),
                live: Arc::new(LiveSnapshots::default()),
                policy,
            }),
        }
    }

    /// Open an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// The version of the newest committed transaction
    pub fn current_version(&self) -> u64 {
        self.inner.backend.current_version()
    }

    /// Run `body` transactionally, retrying on conflict
    ///
    /// The body may run more than once; it must be safe to re-execute from
    /// scratch. Non-conflict errors abort immediately and are returned
    /// as-is. When the retry budget runs out the conflicts seen along the
    /// way are aggregated into [`Error::RetriesExhausted`].
    pub async fn transact<T, F>(&self, body: F) -> Result<T>
    where
        T: Send,
        F: for<'a> FnMut(&'a mut Transaction) -> BoxFuture<'a, Result<T>> + Send,
    {
        retry::drive(self, self.inner.policy, body).await
    }

    /// Run `body` against a read-only snapshot
    ///
    /// No conflict detection, no retries, nothing to commit; writes through
    /// the transaction fail with [`Error::InvalidOperation`].
    pub async fn snapshot<T, F>(&self, body: F) -> Result<T>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut Transaction) -> BoxFuture<'a, Result<T>> + Send,
    {
        let mut tx = self.begin_inner(true).await?;
        body(&mut tx).await
    }

    /// Start an explicit transaction at the current committed version
    ///
    /// Low-level escape hatch: the caller owns the commit and gets no
    /// retry loop. Most code wants [`Store::transact`].
    pub async fn begin(&self) -> Result<Transaction> {
        self.begin_inner(false).await
    }

    /// Takes the commit lock so the snapshot is registered as live before
    /// any concurrent commit can prune history past it.
    async fn begin_inner(&self, read_only: bool) -> Result<Transaction> {
        let _commit = self.inner.commit_lock.lock().await;
        let snapshot = self.inner.backend.snapshot().await?;
        let guard = self.inner.live.register(snapshot.version());
        Ok(Transaction::new(snapshot, read_only, guard))
    }

    /// Validate and flush a transaction
    ///
    /// Read-only outcomes (an empty write-set) skip validation entirely: a
    /// transaction that wrote nothing observed a consistent snapshot and
    /// has nothing to invalidate.
    pub async fn commit(&self, tx: Transaction) -> Result<()> {
        if tx.has_no_writes() {
            return Ok(());
        }

        let _commit = self.inner.commit_lock.lock().await;

        let snapshot_version = tx.snapshot_version();
        if let Some(info) = self
            .inner
            .log
            .lock()
            .find_conflict(tx.reads(), snapshot_version)
        {
            tracing::debug!(
                key = ?info.key,
                version = info.version,
                snapshot = snapshot_version,
                "commit rejected"
            );
            return Err(Error::Conflict(info));
        }

        let batch = tx.into_batch();
        let keys: Vec<_> = batch.keys().cloned().collect();
        let version = self.inner.backend.apply(batch).await?;

        let mut log = self.inner.log.lock();
        log.append(CommitRecord { version, keys });
        // Records at or below the oldest live snapshot can never conflict
        // with anything again. With no snapshots open, every future
        // transaction starts at `version` or later, so the whole log is
        // prunable.
        log.prune_through(self.inner.live.oldest().unwrap_or(version));
        Ok(())
    }
}
