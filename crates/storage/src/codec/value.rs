//! Value codecs
//!
//! Values are opaque bytes to the engine; a [`ValueCodec`] is the seam
//! where typed payloads (documents, CRDT blobs, ids) become bytes and
//! back. [`BincodeCodec`] is the default serde-based implementation.

use bytes::Bytes;
use quill_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes and decodes one value type
///
/// Codecs must be `Send + Sync`; typed views share them across tasks.
pub trait ValueCodec<V>: Send + Sync {
    /// Encode a value into stored bytes
    fn encode(&self, value: &V) -> Result<Bytes>;

    /// Decode stored bytes back into the value type
    fn decode(&self, data: &[u8]) -> Result<V>;
}

/// Serde binary codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<V> ValueCodec<V> for BincodeCodec
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self, value: &V) -> Result<Bytes> {
        let raw = bincode::serialize(value).map_err(|e| Error::Codec(e.to_string()))?;
        Ok(Bytes::from(raw))
    }

    fn decode(&self, data: &[u8]) -> Result<V> {
        bincode::deserialize(data).map_err(|e| Error::Codec(e.to_string()))
    }
}
