//! Inventory ledger orchestration.
//!
//! `LedgerManager` composes the `DocumentStore` and `BlobStore` traits with the pure
//! ledger rules in `pantry-inventory`:
//!
//! ```text
//! add_item / remove_item
//!   ↓
//! 1. Validate input (no IO yet)
//!   ↓
//! 2. Read current document (add also checks the item limit here)
//!   ↓
//! 3. Upload image (add only; failure aborts before any document write)
//!   ↓
//! 4. Apply ledger rule, merge-write or delete the document
//!   ↓
//! 5. Reload every document into the in-memory mirror, notify subscribers
//! ```
//!
//! Every step is awaited in order and attempted once. The upload and the document
//! write are not atomic: a failed write after a successful upload leaves an orphaned
//! blob behind.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::broadcast;

use pantry_core::{DomainError, ItemName, Keyed};
use pantry_inventory::{Entry, InventoryItem, ItemRecord, Removal, ShelfItem};

use crate::blob_store::{BlobError, BlobStore};
use crate::document_store::{Document, DocumentStore, StoreError};

/// Capacity of the snapshot channel; slow subscribers skip to newer snapshots.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected input (blank name, zero quantity, bad file name).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The image could not be stored; nothing was written to the document store.
    #[error("image upload failed: {0}")]
    Upload(#[from] BlobError),

    /// A document read, write or delete failed; the mirror was not refreshed.
    #[error("document store failure: {0}")]
    Store(#[from] StoreError),

    /// A stored document does not have the item shape.
    #[error("failed to decode item '{key}': {message}")]
    Decode { key: String, message: String },
}

/// Image attached to an add-operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name; the blob is stored at `images/<file_name>`.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn blob_path(&self) -> Result<String, DomainError> {
        let name = self.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(DomainError::validation(format!(
                "invalid image file name: {:?}",
                self.file_name
            )));
        }
        Ok(format!("images/{name}"))
    }
}

/// Keeps per-item quantity and entries consistent against an external document store.
///
/// Holds a read-through mirror of the whole collection, replaced wholesale by every
/// `reload()`. Mutations always reload after their write; a failed write returns early
/// and leaves the mirror as it was.
pub struct LedgerManager {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    mirror: RwLock<Arc<Vec<InventoryItem>>>,
    updates: broadcast::Sender<Arc<Vec<InventoryItem>>>,
}

impl LedgerManager {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let (updates, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            store,
            blobs,
            mirror: RwLock::new(Arc::new(Vec::new())),
            updates,
        }
    }

    /// Add `quantity` units of `name`, optionally with a photo.
    pub async fn add_item(
        &self,
        name: &str,
        quantity: u64,
        image: Option<ImageUpload>,
    ) -> Result<(), LedgerError> {
        let name = ItemName::new(name)?;
        Entry::check_quantity(quantity)?;
        let blob_path = image.as_ref().map(ImageUpload::blob_path).transpose()?;

        let existing = self.load(&name).await?;
        if let Some(item) = &existing {
            item.quantity_after_adding(quantity)?;
        }

        let image_url = match (image, blob_path) {
            (Some(image), Some(path)) => {
                self.blobs
                    .put(&path, image.bytes, image.content_type.as_deref())
                    .await?;
                Some(self.blobs.url(&path).await?)
            }
            _ => None,
        };

        let entry = Entry::new(quantity, image_url.clone(), Utc::now())?;
        let item = match existing {
            Some(mut existing) => {
                existing.record_addition(entry)?;
                existing
            }
            None => InventoryItem::create(name.clone(), entry),
        };

        if let Err(e) = self.write(&item).await {
            if let Some(url) = &image_url {
                tracing::warn!(item = %name, url = %url, "document write failed after upload; image is orphaned");
            }
            return Err(e);
        }

        tracing::info!(item = %name, added = quantity, quantity = item.quantity(), "item added");
        self.reload().await?;
        Ok(())
    }

    /// Take one unit of `name` out of the pantry. Absent items are a silent no-op.
    pub async fn remove_item(&self, name: &str) -> Result<(), LedgerError> {
        let name = ItemName::new(name)?;

        match self.load(&name).await? {
            Some(item) => match item.remove_one() {
                Removal::Delete => {
                    self.store.delete(name.as_str()).await?;
                    tracing::info!(item = %name, "last unit removed; item deleted");
                }
                Removal::Update(item) => {
                    self.write(&item).await?;
                    tracing::info!(item = %name, quantity = item.quantity(), "item removed");
                }
                Removal::Unchanged => {
                    tracing::warn!(item = %name, "stored item has no entries; nothing removed");
                }
            },
            None => tracing::debug!(item = %name, "remove on absent item"),
        }

        self.reload().await?;
        Ok(())
    }

    /// Re-fetch every item and replace the mirror.
    ///
    /// Documents that do not decode are skipped with a warning so one bad document
    /// cannot hide the rest of the pantry.
    pub async fn reload(&self) -> Result<Arc<Vec<InventoryItem>>, LedgerError> {
        let docs = self.store.list_all().await?;

        let mut items = Vec::with_capacity(docs.len());
        for (key, doc) in docs {
            match decode(&key, doc) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(error = %e, "skipping undecodable document"),
            }
        }

        let snapshot = Arc::new(items);
        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        tracing::debug!(items = snapshot.len(), "inventory reloaded");

        // No subscribers is fine.
        let _ = self.updates.send(snapshot.clone());
        Ok(snapshot)
    }

    /// The mirror as of the last successful reload.
    pub fn snapshot(&self) -> Arc<Vec<InventoryItem>> {
        self.mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mirrored items whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<InventoryItem> {
        let snapshot = self.snapshot();
        pantry_inventory::search(&snapshot, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Shelf view of the mirror.
    pub fn shelf(&self) -> Vec<ShelfItem> {
        pantry_inventory::shelf(&self.snapshot())
    }

    /// Receive every snapshot produced by later reloads.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<InventoryItem>>> {
        self.updates.subscribe()
    }

    async fn load(&self, name: &ItemName) -> Result<Option<InventoryItem>, LedgerError> {
        match self.store.get(name.as_str()).await? {
            Some(doc) => decode(name.as_str(), doc).map(Some),
            None => Ok(None),
        }
    }

    async fn write(&self, item: &InventoryItem) -> Result<(), LedgerError> {
        let key = item.document_key();
        let fields = match serde_json::to_value(item.to_record()) {
            Ok(JsonValue::Object(fields)) => fields,
            Ok(other) => {
                return Err(LedgerError::Decode {
                    key: key.to_string(),
                    message: format!("record serialized to non-object {other}"),
                });
            }
            Err(e) => {
                return Err(LedgerError::Decode {
                    key: key.to_string(),
                    message: e.to_string(),
                });
            }
        };
        self.store.upsert_merge(key, fields).await?;
        Ok(())
    }
}

fn decode(key: &str, doc: Document) -> Result<InventoryItem, LedgerError> {
    let decode_err = |message: String| LedgerError::Decode {
        key: key.to_string(),
        message,
    };
    let name = ItemName::new(key).map_err(|e| decode_err(e.to_string()))?;
    let record: ItemRecord =
        serde_json::from_value(JsonValue::Object(doc)).map_err(|e| decode_err(e.to_string()))?;
    Ok(InventoryItem::from_record(name, record))
}

impl core::fmt::Debug for LedgerManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedgerManager")
            .field("items", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use super::*;
    use crate::blob_store::{Blob, InMemoryBlobStore};
    use crate::document_store::InMemoryDocumentStore;
    use pantry_inventory::{MAX_ENTRY_QUANTITY, MAX_ITEM_QUANTITY, MAX_TILES_PER_ITEM};

    /// Document store whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryDocumentStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("write rejected".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl DocumentStore for FlakyStore {
        async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
            self.inner.list_all().await
        }

        async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get(key).await
        }

        async fn upsert_merge(&self, key: &str, fields: Document) -> Result<(), StoreError> {
            self.check()?;
            self.inner.upsert_merge(key, fields).await
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(key).await
        }
    }

    /// Blob store that rejects every upload.
    struct RejectingBlobs;

    #[async_trait::async_trait]
    impl BlobStore for RejectingBlobs {
        async fn put(&self, _path: &str, _bytes: Vec<u8>, _ct: Option<&str>) -> Result<(), BlobError> {
            Err(BlobError::Io(std::io::Error::other("bucket unavailable")))
        }

        async fn url(&self, path: &str) -> Result<String, BlobError> {
            Err(BlobError::NotFound(path.to_string()))
        }

        async fn get(&self, _path: &str) -> Result<Option<Blob>, BlobError> {
            Ok(None)
        }
    }

    struct Harness {
        store: Arc<FlakyStore>,
        blobs: Arc<InMemoryBlobStore>,
        ledger: LedgerManager,
    }

    fn harness() -> Harness {
        let store = Arc::new(FlakyStore::default());
        let blobs = Arc::new(InMemoryBlobStore::new("http://blobs.test"));
        let ledger = LedgerManager::new(store.clone(), blobs.clone());
        Harness { store, blobs, ledger }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    fn find(items: &[InventoryItem], name: &str) -> Option<InventoryItem> {
        items.iter().find(|i| i.name().as_str() == name).cloned()
    }

    fn quantities(item: &InventoryItem) -> Vec<u64> {
        item.entries().iter().map(|e| e.quantity).collect()
    }

    async fn seed(store: &FlakyStore, name: &str, quantities: &[u64]) {
        let entries: Vec<_> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| json!({ "quantity": q, "imageURL": "", "timestamp": 1_700_000_000_000i64 + i as i64 }))
            .collect();
        let total: u64 = quantities.iter().sum();
        let doc = json!({ "quantity": total, "entries": entries });
        store
            .inner
            .upsert_merge(name, doc.as_object().cloned().unwrap())
            .await
            .unwrap();
    }

    fn assert_invariants(items: &[InventoryItem]) {
        for item in items {
            item.check_invariants().unwrap();
        }
    }

    #[tokio::test]
    async fn repeated_adds_accumulate() {
        let h = harness();
        h.ledger.add_item("rice", 2, None).await.unwrap();
        h.ledger.add_item("rice", 3, None).await.unwrap();
        h.ledger.add_item("rice", 1, None).await.unwrap();

        let snapshot = h.ledger.snapshot();
        let rice = find(&snapshot, "rice").unwrap();
        assert_eq!(rice.quantity(), 6);
        assert_eq!(quantities(&rice), vec![2, 3, 1]);
        assert!(rice.entries().iter().all(|e| e.image_url.is_empty()));
        assert_invariants(&snapshot);
    }

    #[tokio::test]
    async fn add_then_remove_single_unit_deletes_item() {
        let h = harness();
        h.ledger.add_item("salt", 1, None).await.unwrap();
        h.ledger.remove_item("salt").await.unwrap();

        assert!(h.store.get("salt").await.unwrap().is_none());
        assert!(h.ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn remove_follows_scan_order_tie_break() {
        let h = harness();
        seed(&h.store, "beans", &[2, 1, 3]).await;

        h.ledger.remove_item("beans").await.unwrap();
        let beans = find(&h.ledger.snapshot(), "beans").unwrap();
        assert_eq!(quantities(&beans), vec![1, 1, 3]);
        assert_eq!(beans.quantity(), 5);

        h.ledger.remove_item("beans").await.unwrap();
        let beans = find(&h.ledger.snapshot(), "beans").unwrap();
        assert_eq!(quantities(&beans), vec![1, 3]);
        assert_eq!(beans.quantity(), 4);
        assert_eq!(beans.entries()[0].timestamp.timestamp_millis(), 1_700_000_000_001);
    }

    #[tokio::test]
    async fn remove_single_unit_deletes_regardless_of_entries() {
        let h = harness();
        let doc = json!({ "quantity": 1, "entries": [
            { "quantity": 5, "imageURL": "", "timestamp": 0 }
        ] });
        h.store
            .inner
            .upsert_merge("tea", doc.as_object().cloned().unwrap())
            .await
            .unwrap();

        h.ledger.remove_item("tea").await.unwrap();
        assert!(h.store.get("tea").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_absent_item_is_a_noop_that_still_reloads() {
        let h = harness();
        seed(&h.store, "oats", &[1, 1]).await;
        assert!(h.ledger.snapshot().is_empty());

        h.ledger.remove_item("flour").await.unwrap();

        let snapshot = h.ledger.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(find(&snapshot, "oats").unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn add_with_image_stores_blob_and_url() {
        let h = harness();
        h.ledger.add_item("jam", 2, Some(image("jam.png"))).await.unwrap();

        let jam = find(&h.ledger.snapshot(), "jam").unwrap();
        assert_eq!(jam.entries()[0].image_url, "http://blobs.test/images/jam.png");
        assert!(h.blobs.get("images/jam.png").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_upload_writes_nothing() {
        let store = Arc::new(FlakyStore::default());
        let ledger = LedgerManager::new(store.clone(), Arc::new(RejectingBlobs));

        let err = ledger.add_item("jam", 1, Some(image("jam.png"))).await.unwrap_err();

        assert!(matches!(err, LedgerError::Upload(_)));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_mirror_stale() {
        let h = harness();
        h.ledger.add_item("milk", 1, None).await.unwrap();

        h.store.fail_writes(true);
        let err = h.ledger.add_item("milk", 4, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(find(&h.ledger.snapshot(), "milk").unwrap().quantity(), 1);

        let err = h.ledger.remove_item("milk").await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert!(find(&h.ledger.snapshot(), "milk").is_some());
    }

    #[tokio::test]
    async fn rejects_invalid_input_before_io() {
        let h = harness();
        assert!(matches!(
            h.ledger.add_item("rice", 0, None).await,
            Err(LedgerError::Domain(DomainError::Validation(_)))
        ));
        assert!(matches!(
            h.ledger.add_item("  ", 1, None).await,
            Err(LedgerError::Domain(DomainError::Validation(_)))
        ));
        assert!(matches!(
            h.ledger.add_item("rice", 1, Some(image("../x.png"))).await,
            Err(LedgerError::Domain(DomainError::Validation(_)))
        ));
        assert!(h.blobs.is_empty());
        assert!(h.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_quantities_are_rejected_before_io() {
        let h = harness();
        assert!(matches!(
            h.ledger
                .add_item("rice", 1_000_000_000_000, Some(image("rice.png")))
                .await,
            Err(LedgerError::Domain(DomainError::Validation(_)))
        ));
        assert!(h.blobs.is_empty());
        assert!(h.store.list_all().await.unwrap().is_empty());

        for _ in 0..(MAX_ITEM_QUANTITY / MAX_ENTRY_QUANTITY) {
            h.ledger.add_item("rice", MAX_ENTRY_QUANTITY, None).await.unwrap();
        }
        assert!(matches!(
            h.ledger.add_item("rice", 1, Some(image("rice.png"))).await,
            Err(LedgerError::Domain(DomainError::Validation(_)))
        ));
        assert!(h.blobs.is_empty());

        let rice = find(&h.ledger.snapshot(), "rice").unwrap();
        assert_eq!(rice.quantity(), MAX_ITEM_QUANTITY);
        assert_eq!(h.ledger.shelf()[0].tiles.len(), MAX_TILES_PER_ITEM);
    }

    #[tokio::test]
    async fn merge_write_keeps_unrelated_fields() {
        let h = harness();
        let doc = json!({ "quantity": 1, "entries": [
            { "quantity": 1, "imageURL": "", "timestamp": 0 }
        ], "category": "baking" });
        h.store
            .inner
            .upsert_merge("flour", doc.as_object().cloned().unwrap())
            .await
            .unwrap();

        h.ledger.add_item("flour", 2, None).await.unwrap();

        let stored = h.store.get("flour").await.unwrap().unwrap();
        assert_eq!(stored["category"], json!("baking"));
        assert_eq!(stored["quantity"], json!(3));
    }

    #[tokio::test]
    async fn reload_skips_undecodable_documents() {
        let h = harness();
        seed(&h.store, "pasta", &[2]).await;
        h.store
            .inner
            .upsert_merge("broken", json!({ "quantity": "lots" }).as_object().cloned().unwrap())
            .await
            .unwrap();

        let items = h.ledger.reload().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name().as_str(), "pasta");
    }

    #[tokio::test]
    async fn subscribers_see_each_reload() {
        let h = harness();
        let mut rx = h.ledger.subscribe();

        h.ledger.add_item("eggs", 12, None).await.unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(find(&snapshot, "eggs").unwrap().quantity(), 12);
    }

    #[tokio::test]
    async fn search_and_shelf_read_the_mirror() {
        let h = harness();
        h.ledger.add_item("Brown Rice", 2, None).await.unwrap();
        h.ledger.add_item("pasta", 1, None).await.unwrap();

        let hits = h.ledger.search("rice");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name().as_str(), "Brown Rice");

        let shelf = h.ledger.shelf();
        let tiles: usize = shelf.iter().map(|s| s.tiles.len()).sum();
        assert_eq!(tiles, 3);
    }
}
