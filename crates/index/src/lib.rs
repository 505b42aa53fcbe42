//! Secondary indexes for quillstore
//!
//! An [`Index`] maintains a derived ordering over documents inside the
//! same transaction that mutates them: the repository calls
//! [`Index::sync`] with the before/after images of a document, and the
//! index entries stay exactly consistent with the primary records —
//! committed atomically with them, conflict-checked with them, retried
//! with them.
//!
//! Unique indexes map one computed key to one document id and reject a
//! second claimant. Non-unique indexes suffix the computed key with the
//! owning id, so documents sharing a key coexist in stable id order.

#![warn(clippy::all)]

pub mod index;
pub mod key;

pub use index::Index;
pub use key::{IndexKey, IndexKeyPart};
