use std::collections::BTreeMap;
use std::sync::RwLock;

use super::r#trait::{Document, DocumentStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Lists documents in key order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.get(key).cloned())
    }

    async fn upsert_merge(&self, key: &str, fields: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| StoreError::LockPoisoned)?;
        let doc = docs.entry(key.to_string()).or_default();
        for (field, value) in fields {
            doc.insert(field, value);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| StoreError::LockPoisoned)?;
        docs.remove(key);
        Ok(())
    }
}
