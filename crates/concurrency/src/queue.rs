//! Per-key task serialization
//!
//! A [`KeyedQueue`] runs tasks for the same key one at a time, in arrival
//! order, while tasks for different keys proceed concurrently. Useful in
//! front of `transact` when many callers hammer the same resource and
//! optimistic retries would mostly burn work: queueing turns the conflict
//! storm into an orderly line.
//!
//! Slots are created on demand and removed as soon as the last waiter for
//! a key finishes, so an idle queue holds no state.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;

struct Slot {
    // tokio's mutex queues waiters fairly, which is what gives FIFO order
    lock: Arc<tokio::sync::Mutex<()>>,
    waiters: usize,
}

/// Serializes tasks per key; independent keys run concurrently
#[derive(Default)]
pub struct KeyedQueue {
    slots: DashMap<String, Slot>,
}

impl KeyedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after every earlier task for the same key has finished
    pub async fn run<T, F, Fut>(&self, key: &str, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lock = {
            let mut slot = self.slots.entry(key.to_owned()).or_insert_with(|| Slot {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                waiters: 0,
            });
            slot.waiters += 1;
            Arc::clone(&slot.lock)
        };

        let result = {
            let _held = lock.lock().await;
            task().await
        };

        if let Some(mut slot) = self.slots.get_mut(key) {
            slot.waiters -= 1;
            if slot.waiters == 0 {
                drop(slot);
                self.slots.remove_if(key, |_, s| s.waiters == 0);
            }
        }
        result
    }

    /// Number of keys with running or queued tasks
    pub fn active_keys(&self) -> usize {
        self.slots.len()
    }
}
