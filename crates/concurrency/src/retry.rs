//! Retry-on-conflict driver
//!
//! Conflicted commits are retried from a fresh snapshot up to the policy's
//! budget. Every other error aborts the loop immediately. When the budget
//! runs out the conflicts collected along the way are surfaced together so
//! the caller can see what kept invalidating the work.

use crate::store::Store;
use crate::transaction::Transaction;
use futures::future::BoxFuture;
use quill_core::{Error, Result};

/// Knobs for the transaction retry loop
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `transact` runs at most
    /// `conflict_retry_count + 1` times
    pub conflict_retry_count: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            conflict_retry_count: 10,
        }
    }
}

pub(crate) async fn drive<T, F>(store: &Store, policy: RetryPolicy, mut body: F) -> Result<T>
where
    T: Send,
    F: for<'a> FnMut(&'a mut Transaction) -> BoxFuture<'a, Result<T>> + Send,
{
    let mut conflicts = Vec::new();
    loop {
        let mut tx = store.begin().await?;
        let value = body(&mut tx).await?;
        match store.commit(tx).await {
            Ok(()) => return Ok(value),
            Err(Error::Conflict(info)) => {
                conflicts.push(info);
                if conflicts.len() as u64 > policy.conflict_retry_count as u64 {
                    tracing::warn!(
                        attempts = conflicts.len(),
                        "transaction retry budget exhausted"
                    );
                    return Err(Error::RetriesExhausted { attempts: conflicts });
                }
                tracing::debug!(attempt = conflicts.len(), "conflict, retrying");
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key(k: &str) -> Bytes {
        Bytes::copy_from_slice(k.as_bytes())
    }

    #[tokio::test]
    async fn body_runs_once_without_contention() {
        let store = Store::in_memory();
        let runs = AtomicU32::new(0);
        store
            .transact(|tx| {
                runs.fetch_add(1, Ordering::SeqCst);
                async move {
                    tx.put(key("k"), key("v"))?;
                    Ok(())
                }
                .boxed()
            })
            .await
            .unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn conflicted_body_reruns_and_converges() {
        let store = Store::in_memory();
        let runs = AtomicU32::new(0);

        // First run reads "k", then we inject a competing commit to "k"
        // before this body's commit; the rerun sees clean state.
        let interfere = store.clone();
        store
            .transact(|tx| {
                let attempt = runs.fetch_add(1, Ordering::SeqCst);
                let interfere = interfere.clone();
                async move {
                    tx.get(&key("k")).await?;
                    tx.put(key("out"), key("x"))?;
                    if attempt == 0 {
                        interfere
                            .transact(|inner| {
                                async move {
                                    inner.put(key("k"), key("bump"))?;
                                    Ok(())
                                }
                                .boxed()
                            })
                            .await?;
                    }
                    Ok(())
                }
                .boxed()
            })
            .await
            .unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_aggregates_every_conflict() {
        let store = Store::with_policy(
            quill_storage::MemoryBackend::new(),
            RetryPolicy {
                conflict_retry_count: 2,
            },
        );

        // Every attempt reads "k" and then bumps "k" through a side
        // transaction, so every commit conflicts.
        let interfere = store.clone();
        let err = store
            .transact(|tx| {
                let interfere = interfere.clone();
                async move {
                    tx.get(&key("k")).await?;
                    tx.put(key("out"), key("x"))?;
                    interfere
                        .transact(|inner| {
                            async move {
                                inner.put(key("k"), key("bump"))?;
                                Ok(())
                            }
                            .boxed()
                        })
                        .await?;
                    Ok(())
                }
                .boxed()
            })
            .await
            .unwrap_err();

        match err {
            Error::RetriesExhausted { attempts } => assert_eq!(attempts.len(), 3),
            other => panic!("expected RetriesExhausted, got {other}"),
        }
    }

    #[tokio::test]
    async fn non_conflict_errors_abort_without_retry() {
        let store = Store::in_memory();
        let runs = AtomicU32::new(0);
        let err = store
            .transact::<(), _>(|_tx| {
                runs.fetch_add(1, Ordering::SeqCst);
                async move { Err(Error::NotFound("doc".into())) }.boxed()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
