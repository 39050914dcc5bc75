//! File-backed receipt store.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{MemoryStore, ReceiptFilter, ReceiptStore};
use crate::error::{Result, StoreError};
use crate::models::receipt::{Receipt, ReceiptId, ReceiptUpdate};

/// Receipts kept in a JSON file, rewritten after every change.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let inner = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(StoreError::from)?;
            let inner: MemoryStore = serde_json::from_str(&content).map_err(StoreError::from)?;
            debug!("Loaded {} receipts from {}", inner.len(), path.display());
            inner
        } else {
            MemoryStore::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy and keep it only once the file is written.
    fn commit<T>(&mut self, change: impl FnOnce(&mut MemoryStore) -> Result<T>) -> Result<T> {
        let mut next = self.inner.clone();
        let value = change(&mut next)?;
        self.write(&next)?;
        self.inner = next;
        Ok(value)
    }

    fn write(&self, store: &MemoryStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::from)?;
        }
        let content = serde_json::to_string_pretty(store).map_err(StoreError::from)?;
        std::fs::write(&self.path, content).map_err(StoreError::from)?;
        Ok(())
    }
}

impl ReceiptStore for JsonStore {
    fn create(&mut self, receipt: Receipt) -> Result<ReceiptId> {
        self.commit(|store| store.create(receipt))
    }

    fn get(&self, id: ReceiptId) -> Result<Receipt> {
        self.inner.get(id)
    }

    fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        self.inner.list(filter)
    }

    fn update(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt> {
        self.commit(|store| store.update(id, update))
    }

    fn delete(&mut self, id: ReceiptId) -> Result<()> {
        self.commit(|store| store.delete(id))
    }

    fn check_duplicate(&self, content_hash: &str) -> Result<Option<ReceiptId>> {
        self.inner.check_duplicate(content_hash)
    }

    fn clear(&mut self) -> Result<()> {
        self.commit(|store| store.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TallyError;
    use crate::models::receipt::ReceiptDraft;
    use tempfile::tempdir;

    fn receipt(vendor: &str, hash: &str) -> Receipt {
        ReceiptDraft {
            content_hash: hash.to_string(),
            category: Some("Gas".to_string()),
            ..Receipt::draft("fuel.txt", vendor, "2024-03-02", "41.17")
        }
        .build()
        .unwrap()
    }

    #[test]
    fn test_reopen_restores_receipts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("receipts.json");

        let mut store = JsonStore::open(&path).unwrap();
        let first = store.create(receipt("Shell", "a")).unwrap();
        let second = store.create(receipt("Exxon", "b")).unwrap();
        store.delete(first).unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        let all = reopened.list(&ReceiptFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), Some(second));
        assert_eq!(all[0].vendor(), "Exxon");
        assert_eq!(all[0].category(), "Gas");
        assert_eq!(reopened.check_duplicate("b").unwrap(), Some(second));
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.json");

        let mut store = JsonStore::open(&path).unwrap();
        store.create(receipt("Shell", "a")).unwrap();
        store.create(receipt("Shell", "b")).unwrap();

        let mut reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.create(receipt("Shell", "c")).unwrap(), ReceiptId(3));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonStore::open(&path),
            Err(TallyError::Store(StoreError::Serde(_)))
        ));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut store = JsonStore::open(blocker.join("receipts.json")).unwrap();
        assert!(matches!(
            store.create(receipt("Shell", "a")),
            Err(TallyError::Store(StoreError::Io(_)))
        ));
        assert!(store.list(&ReceiptFilter::default()).unwrap().is_empty());
        assert_eq!(store.check_duplicate("a").unwrap(), None);
    }

    #[test]
    fn test_failed_write_keeps_existing_receipts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.json");

        let mut store = JsonStore::open(&path).unwrap();
        let id = store.create(receipt("Shell", "a")).unwrap();

        // A directory in place of the file makes every later write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let update = ReceiptUpdate {
            vendor: Some("Exxon".to_string()),
            ..Default::default()
        };
        assert!(store.update(id, &update).is_err());
        assert!(store.delete(id).is_err());
        assert!(store.clear().is_err());

        let all = store.list(&ReceiptFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].vendor(), "Shell");
        assert!(store.create(receipt("Exxon", "b")).is_err());
        assert_eq!(store.check_duplicate("b").unwrap(), None);
    }
}
