//! Quillstore: a transactional, in-process MVCC key-value store
//!
//! The persistence engine for a collaborative document application.
//! Transactions read from consistent snapshots, buffer writes locally,
//! and validate optimistically at commit: a transaction fails only when
//! something it actually read (a key, or a key range) was overwritten by
//! a commit newer than its snapshot. Blind writers never conflict.
//!
//! The crates underneath:
//! - `quill-core`: conditions, errors, the order-preserving tuple codec,
//!   and the storage traits
//! - `quill-storage`: the in-memory versioned backend, subspaces, and
//!   value codecs
//! - `quill-concurrency`: transactions, conflict detection, the retry
//!   driver, the keyed queue, and typed views
//! - `quill-index`: transactionally-synchronized secondary indexes
//!
//! # Example
//!
//! ```
//! use quillstore::{Store, Condition};
//! use bytes::Bytes;
//! use futures::FutureExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> quillstore::Result<()> {
//! let store = Store::in_memory();
//! store
//!     .transact(|tx| {
//!         async move {
//!             tx.put(Bytes::from("doc/1"), Bytes::from("hello"))?;
//!             Ok(())
//!         }
//!         .boxed()
//!     })
//!     .await?;
//!
//! let value = store
//!     .snapshot(|tx| async move { tx.get(&Bytes::from("doc/1")).await }.boxed())
//!     .await?;
//! assert_eq!(value, Some(Bytes::from("hello")));
//! # Ok(())
//! # }
//! ```

pub use quill_core::{
    pack, unpack, Condition, ConflictInfo, Direction, DocId, Entry, Error, ReadKind, Result,
    SnapshotView, StorageBackend, TuplePart, WriteBatch,
};

pub use quill_storage::{BincodeCodec, MemoryBackend, Subspace, ValueCodec};

pub use quill_concurrency::{KeyedQueue, QueryStream, RetryPolicy, Store, Transaction, TypedView};

pub use quill_index::{Index, IndexKey, IndexKeyPart};
