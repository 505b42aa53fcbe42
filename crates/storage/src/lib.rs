//! Storage layer for quillstore
//!
//! Two concerns live here, both free of concurrency logic:
//! - [`MemoryBackend`]: the in-memory implementation of the ordered byte
//!   store contract
//! - [`codec`]: structural adapters that present the byte keyspace as a
//!   store over typed keys and values (tuple-prefixed subspaces, value
//!   codecs)

#![warn(clippy::all)]

pub mod codec;
pub mod memory;

pub use codec::{BincodeCodec, Subspace, ValueCodec};
pub use memory::MemoryBackend;
