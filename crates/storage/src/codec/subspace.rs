//! Tuple-prefixed keyspaces
//!
//! A [`Subspace`] namespaces a slice of the global keyspace under a fixed
//! tuple prefix. Because the tuple codec is prefix-faithful (no encoding
//! of a tuple is a prefix of a different tuple's encoding unless the
//! second extends the first), byte-prefix containment is exactly tuple
//! containment.

use bytes::{Bytes, BytesMut};
use quill_core::tuple::{pack, unpack, TuplePart};
use quill_core::{Condition, Error, Result};

/// A contiguous, tuple-prefixed region of the keyspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subspace {
    prefix: Bytes,
}

impl Subspace {
    /// Create a subspace rooted at the given tuple
    pub fn new(parts: &[TuplePart]) -> Self {
        Subspace { prefix: pack(parts) }
    }

    /// The raw prefix bytes
    pub fn prefix(&self) -> &Bytes {
        &self.prefix
    }

    /// Encode a key tuple inside this subspace
    pub fn pack(&self, parts: &[TuplePart]) -> Bytes {
        let suffix = pack(parts);
        let mut out = BytesMut::with_capacity(self.prefix.len() + suffix.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&suffix);
        out.freeze()
    }

    /// Decode a full key back into its in-subspace tuple
    ///
    /// Fails with [`Error::Codec`] when the key does not carry this
    /// subspace's prefix.
    pub fn unpack(&self, key: &[u8]) -> Result<Vec<TuplePart>> {
        let suffix = key
            .strip_prefix(self.prefix.as_ref())
            .ok_or_else(|| Error::Codec("key outside subspace".into()))?;
        unpack(suffix)
    }

    /// Whether a full key lies inside this subspace
    pub fn contains(&self, key: &[u8]) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Translate a tuple-level condition into a byte-level one
    ///
    /// The comparison kind is preserved; only the bound is packed. Scans
    /// built from the result must still stop at the subspace boundary
    /// (one-sided conditions run to the end of the keyspace).
    pub fn condition(&self, condition: Condition<Vec<TuplePart>>) -> Condition<Bytes> {
        condition.map(|bound| self.pack(&bound))
    }
}
