//! In-process receipt store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ReceiptFilter, ReceiptStore};
use crate::error::{Result, StoreError};
use crate::models::receipt::{Receipt, ReceiptId, ReceiptUpdate};

/// Receipts held in memory, keyed by identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    next_id: u64,
    #[serde(with = "receipt_list")]
    receipts: BTreeMap<ReceiptId, Receipt>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            receipts: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}

impl ReceiptStore for MemoryStore {
    fn create(&mut self, receipt: Receipt) -> Result<ReceiptId> {
        if let Some(existing) = self.check_duplicate(receipt.content_hash())? {
            return Err(StoreError::Duplicate { existing }.into());
        }

        let id = ReceiptId(self.next_id);
        self.next_id += 1;
        self.receipts.insert(id, receipt.with_id(id));

        debug!("Stored receipt {}", id);
        Ok(id)
    }

    fn get(&self, id: ReceiptId) -> Result<Receipt> {
        self.receipts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id).into())
    }

    fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        Ok(filter.apply(self.receipts.values()))
    }

    fn update(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt> {
        let current = self.receipts.get(&id).ok_or(StoreError::NotFound(id))?;
        let updated = current.corrected(update)?;
        self.receipts.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete(&mut self, id: ReceiptId) -> Result<()> {
        self.receipts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id).into())
    }

    fn check_duplicate(&self, content_hash: &str) -> Result<Option<ReceiptId>> {
        // receipts without a hash never collide
        if content_hash.is_empty() {
            return Ok(None);
        }
        Ok(self
            .receipts
            .iter()
            .find(|(_, receipt)| receipt.content_hash() == content_hash)
            .map(|(id, _)| *id))
    }

    fn clear(&mut self) -> Result<()> {
        self.receipts.clear();
        Ok(())
    }
}

/// Serialize the map as a plain list; ids live inside each receipt.
mod receipt_list {
    use std::collections::BTreeMap;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::models::receipt::{Receipt, ReceiptId};

    pub fn serialize<S: Serializer>(
        receipts: &BTreeMap<ReceiptId, Receipt>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&Receipt> = receipts.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<ReceiptId, Receipt>, D::Error> {
        Vec::<Receipt>::deserialize(deserializer)?
            .into_iter()
            .map(|receipt| match receipt.id() {
                Some(id) => Ok((id, receipt)),
                None => Err(D::Error::custom("stored receipt has no id")),
            })
            .collect()
    }
}
