//! Optimistic concurrency control for quillstore
//!
//! This crate implements the transactional engine:
//! - [`Transaction`]: snapshot reads, buffered writes, read-set tracking
//! - Conflict detection at commit time over point and range reads
//! - [`Store`]: the public facade with `transact` (retry-on-conflict) and
//!   `snapshot` (read-only)
//! - [`KeyedQueue`]: per-resource serialization of racing callers
//! - [`TypedView`]: a typed, subspace-scoped adapter over a transaction
//!
//! Transaction bodies run fully concurrently; only the conflict-check-and-
//! flush step is mutually exclusive, behind one async mutex per store
//! instance.

#![warn(clippy::all)]

mod conflict;
mod snapshot;

pub mod queue;
pub mod retry;
pub mod store;
pub mod transaction;
pub mod typed;

pub use queue::KeyedQueue;
pub use retry::RetryPolicy;
pub use store::Store;
pub use transaction::{QueryStream, Transaction};
pub use typed::TypedView;
