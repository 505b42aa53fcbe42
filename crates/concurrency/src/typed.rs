//! Typed, subspace-scoped access over a transaction
//!
//! [`TypedView`] narrows a [`Transaction`] to one [`Subspace`] and one
//! value type: callers speak tuples and `V`, the view speaks packed keys
//! and encoded bytes to the transaction underneath. Conflict tracking is
//! unchanged; the view is only a codec layer.

use crate::transaction::Transaction;
use futures::StreamExt;
use quill_core::{Condition, Result, TuplePart};
use quill_storage::{BincodeCodec, Subspace, ValueCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Tuple-keyed, typed-value window onto one subspace of a transaction
pub struct TypedView<'t, V, C = BincodeCodec> {
    tx: &'t mut Transaction,
    space: Subspace,
    codec: C,
    _values: PhantomData<fn() -> V>,
}

impl<'t, V> TypedView<'t, V, BincodeCodec>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(tx: &'t mut Transaction, space: Subspace) -> Self {
        Self::with_codec(tx, space, BincodeCodec)
    }
}

impl<'t, V, C> TypedView<'t, V, C>
where
    C: ValueCodec<V>,
{
    pub fn with_codec(tx: &'t mut Transaction, space: Subspace, codec: C) -> Self {
        TypedView {
            tx,
            space,
            codec,
            _values: PhantomData,
        }
    }

    pub fn subspace(&self) -> &Subspace {
        &self.space
    }

    pub async fn get(&mut self, key: &[TuplePart]) -> Result<Option<V>> {
        let packed = self.space.pack(key);
        match self.tx.get(&packed).await? {
            Some(raw) => Ok(Some(self.codec.decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn put(&mut self, key: &[TuplePart], value: &V) -> Result<()> {
        let packed = self.space.pack(key);
        let raw = self.codec.encode(value)?;
        self.tx.put(packed, raw)
    }

    pub fn delete(&mut self, key: &[TuplePart]) -> Result<()> {
        self.tx.delete(self.space.pack(key))
    }

    /// Range scan within the subspace, decoded
    ///
    /// The condition's tuple bound is packed under the subspace prefix and
    /// the scan stops at the first key outside it, so neighbouring
    /// subspaces never leak in.
    pub async fn query(
        &mut self,
        condition: Condition<Vec<TuplePart>>,
    ) -> Result<Vec<(Vec<TuplePart>, V)>> {
        let raw_condition = self.space.condition(condition);
        let mut stream = self.tx.query(&raw_condition).await?;

        let mut results = Vec::new();
        while let Some(entry) = stream.next().await {
            let entry = entry?;
            if !self.space.contains(&entry.key) {
                break;
            }
            let key = self.space.unpack(&entry.key)?;
            let value = self.codec.decode(&entry.value)?;
            results.push((key, value));
        }
        Ok(results)
    }
}
