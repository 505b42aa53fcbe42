//! Index definition and synchronization
//!
//! Entry layout, with keys packed under the index's subspace:
//!
//! - unique:     `pack(key)        -> id`
//! - non-unique: `pack(key ++ id)  -> id`
//!
//! The id suffix keeps documents that share a computed key from
//! colliding and gives them a stable iteration order. Range bounds over a
//! non-unique index must account for that suffix: an upper-side bound
//! that should take all entries sharing the bound's key (`lte`), or none
//! of them (`gt`), is padded with the maximal `undefined` sentinel before
//! packing, so the id suffixes sort strictly below the padded bound.

use crate::key::{to_tuple, IndexKey, IndexKeyPart};
use bytes::Bytes;
use futures::StreamExt;
use quill_concurrency::Transaction;
use quill_core::{Condition, DocId, Error, Result, TuplePart};
use quill_storage::Subspace;

type Selector<D, T> = Box<dyn Fn(&D) -> T + Send + Sync>;

/// A transactionally-maintained secondary ordering over documents
///
/// The key selector returns `None` to leave a document out of the index
/// entirely (a partial index).
pub struct Index<D> {
    name: String,
    unique: bool,
    space: Subspace,
    id_of: Selector<D, DocId>,
    key_of: Selector<D, Option<IndexKey>>,
}

impl<D> Index<D> {
    /// An index where each computed key belongs to at most one document
    pub fn unique(
        name: impl Into<String>,
        space: Subspace,
        id_of: impl Fn(&D) -> DocId + Send + Sync + 'static,
        key_of: impl Fn(&D) -> Option<IndexKey> + Send + Sync + 'static,
    ) -> Self {
        Self::build(name, true, space, id_of, key_of)
    }

    /// An index where documents may share a computed key
    pub fn non_unique(
        name: impl Into<String>,
        space: Subspace,
        id_of: impl Fn(&D) -> DocId + Send + Sync + 'static,
        key_of: impl Fn(&D) -> Option<IndexKey> + Send + Sync + 'static,
    ) -> Self {
        Self::build(name, false, space, id_of, key_of)
    }

    fn build(
        name: impl Into<String>,
        unique: bool,
        space: Subspace,
        id_of: impl Fn(&D) -> DocId + Send + Sync + 'static,
        key_of: impl Fn(&D) -> Option<IndexKey> + Send + Sync + 'static,
    ) -> Self {
        Index {
            name: name.into(),
            unique,
            space,
            id_of: Box::new(id_of),
            key_of: Box::new(key_of),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Bring the index in line with one document mutation
    ///
    /// Call inside the same transaction as the primary write, with the
    /// before image (`None` on create) and after image (`None` on
    /// delete). The entry updates ride the transaction's write-set and
    /// commit, conflict-check, and retry together with the document.
    pub async fn sync(
        &self,
        tx: &mut Transaction,
        prev: Option<&D>,
        next: Option<&D>,
    ) -> Result<()> {
        let id = match (prev, next) {
            (None, None) => return Ok(()),
            (Some(p), Some(n)) => {
                let id = (self.id_of)(p);
                if id != (self.id_of)(n) {
                    return Err(Error::IdMismatch {
                        index: self.name.clone(),
                    });
                }
                id
            }
            (Some(doc), None) | (None, Some(doc)) => (self.id_of)(doc),
        };

        let prev_key = prev.and_then(|d| (self.key_of)(d));
        let next_key = next.and_then(|d| (self.key_of)(d));
        if prev_key == next_key {
            return Ok(());
        }

        if let Some(key) = prev_key {
            tx.delete(self.entry_key(&key, id))?;
        }
        if let Some(key) = next_key {
            if self.unique {
                let target = self.entry_key(&key, id);
                // The read lands in the read-set, so a racing claim of
                // this key is caught at commit even when the slot looks
                // free here.
                if let Some(holder) = tx.get(&target).await? {
                    if holder != id_bytes(id) {
                        tracing::debug!(index = %self.name, "unique key already held");
                        return Err(Error::UniqueViolation {
                            index: self.name.clone(),
                        });
                    }
                }
                tx.put(target, id_bytes(id))?;
            } else {
                tx.put(self.entry_key(&key, id), id_bytes(id))?;
            }
        }
        Ok(())
    }

    /// Ids of every document whose computed key equals `key` exactly
    ///
    /// Runs an ascending `gte` scan from the packed key and stops at the
    /// first entry whose decoded leading parts diverge from it. The
    /// comparison is on decoded parts, not encoded bytes: a neighbouring
    /// key can byte-extend the packed query (an embedded NUL in a text
    /// part does) without its leading parts matching. For a unique index
    /// the result has at most one element.
    pub async fn get(&self, tx: &mut Transaction, key: &[IndexKeyPart]) -> Result<Vec<DocId>> {
        let wanted = to_tuple(key);
        let mut stream = tx.query(&Condition::Gte(self.space.pack(&wanted))).await?;

        let mut ids = Vec::new();
        while let Some(entry) = stream.next().await {
            let entry = entry?;
            if !self.space.contains(&entry.key) {
                break;
            }
            let decoded = self.space.unpack(&entry.key)?;
            if decoded.len() < wanted.len() || decoded[..wanted.len()] != wanted[..] {
                break;
            }
            ids.push(DocId::from_slice(&entry.value)?);
        }
        Ok(ids)
    }

    /// Ids of every document whose computed key satisfies `condition`
    ///
    /// Results follow the condition's direction; documents sharing a key
    /// in a non-unique index appear in id order within it.
    pub async fn query(
        &self,
        tx: &mut Transaction,
        condition: Condition<IndexKey>,
    ) -> Result<Vec<DocId>> {
        // Padding applies to the two bound kinds whose meaning would be
        // changed by the id suffix: `gt` (suffixed entries at the bound
        // must stay out) and `lte` (they must all come in). `gte` and
        // `lt` already behave, since the suffixed entries sort just
        // above the bare packed key.
        let pad = !self.unique && matches!(condition, Condition::Gt(_) | Condition::Lte(_));
        let raw = condition.map(|bound| {
            let mut parts = to_tuple(&bound);
            if pad {
                parts.push(TuplePart::Undefined);
            }
            self.space.pack(&parts)
        });
        let mut stream = tx.query(&raw).await?;

        let mut ids = Vec::new();
        while let Some(entry) = stream.next().await {
            let entry = entry?;
            if !self.space.contains(&entry.key) {
                break;
            }
            ids.push(DocId::from_slice(&entry.value)?);
        }
        Ok(ids)
    }

    fn entry_key(&self, key: &IndexKey, id: DocId) -> Bytes {
        let mut parts = to_tuple(key);
        if !self.unique {
            parts.push(IndexKeyPart::Id(id).to_tuple());
        }
        self.space.pack(&parts)
    }
}

fn id_bytes(id: DocId) -> Bytes {
    Bytes::copy_from_slice(id.as_bytes())
}
