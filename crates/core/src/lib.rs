//! Core types for quillstore
//!
//! This crate holds the leaf types shared by every other layer:
//! - The error taxonomy and `Result` alias
//! - Byte-string entries and document ids
//! - The order-preserving tuple codec for composite keys
//! - The `Condition` type describing half-open range scans
//! - The backend storage traits (ordered byte store contract)
//!
//! No concurrency logic lives here.

#![warn(clippy::all)]

pub mod condition;
pub mod error;
pub mod traits;
pub mod tuple;
pub mod types;

pub use condition::{Condition, Direction};
pub use error::{ConflictInfo, Error, ReadKind, Result};
pub use traits::{SnapshotView, StorageBackend, WriteBatch};
pub use tuple::{pack, unpack, TuplePart};
pub use types::{DocId, Entry};
