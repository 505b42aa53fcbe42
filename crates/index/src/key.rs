//! Index key parts
//!
//! Index keys are tuples of these parts, encoded through the
//! order-preserving tuple codec. [`IndexKeyPart::Id`] exists so a
//! document id can participate in a key (non-unique indexes suffix every
//! entry with it); it encodes as the id's raw bytes, which compare
//! consistently in both the byte and tuple orders.

use bytes::Bytes;
use quill_core::{DocId, TuplePart};

/// A computed index key: one or more parts, compared part by part
pub type IndexKey = Vec<IndexKeyPart>;

/// One component of an index key
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKeyPart {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Bytes(Bytes),
    Id(DocId),
    /// Maximal sentinel; sorts after every other part
    Undefined,
}

impl IndexKeyPart {
    /// Convenience constructor for text parts
    pub fn text(s: impl Into<String>) -> Self {
        IndexKeyPart::Text(s.into())
    }

    pub(crate) fn to_tuple(&self) -> TuplePart {
        match self {
            IndexKeyPart::Null => TuplePart::Null,
            IndexKeyPart::Bool(b) => TuplePart::Bool(*b),
            IndexKeyPart::Number(n) => TuplePart::Number(*n),
            IndexKeyPart::Text(s) => TuplePart::Text(s.clone()),
            IndexKeyPart::Bytes(b) => TuplePart::Bytes(b.clone()),
            IndexKeyPart::Id(id) => TuplePart::Bytes(Bytes::copy_from_slice(id.as_bytes())),
            IndexKeyPart::Undefined => TuplePart::Undefined,
        }
    }
}

impl From<&str> for IndexKeyPart {
    fn from(s: &str) -> Self {
        IndexKeyPart::Text(s.to_owned())
    }
}

impl From<f64> for IndexKeyPart {
    fn from(n: f64) -> Self {
        IndexKeyPart::Number(n)
    }
}

impl From<bool> for IndexKeyPart {
    fn from(b: bool) -> Self {
        IndexKeyPart::Bool(b)
    }
}

impl From<DocId> for IndexKeyPart {
    fn from(id: DocId) -> Self {
        IndexKeyPart::Id(id)
    }
}

pub(crate) fn to_tuple(key: &[IndexKeyPart]) -> Vec<TuplePart> {
    key.iter().map(IndexKeyPart::to_tuple).collect()
}
