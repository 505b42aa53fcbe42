//! Byte-string entries and document identity

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A key/value pair as returned by range scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The full encoded key
    pub key: Bytes,
    /// The stored value bytes
    pub value: Bytes,
}

impl Entry {
    /// Create an entry from key and value bytes
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Document identifier
///
/// Ids compare by their canonical 16-byte encoding, which is also how they
/// sort when suffixed onto non-unique index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(Uuid);

impl DocId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        DocId(Uuid::new_v4())
    }

    /// The canonical byte encoding
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Reconstruct an id from its canonical encoding
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        DocId(Uuid::from_bytes(bytes))
    }

    /// Reconstruct an id from a stored byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::Codec(format!("document id must be 16 bytes, got {}", bytes.len())))?;
        Ok(DocId(Uuid::from_bytes(arr)))
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
