use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// A stored document: a JSON object of top-level fields.
pub type Document = Map<String, JsonValue>;

/// Document store operation error.
///
/// These are **infrastructure errors** (backend unavailable, rejected write) as opposed
/// to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store backend error: {0}")]
    Backend(String),

    #[error("document store lock poisoned")]
    LockPoisoned,
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Keyed document store scoped to one collection.
///
/// ## Write semantics
///
/// `upsert_merge()` creates the document when the key is absent. When it exists, each
/// top-level field in `fields` replaces the stored field of the same name and every
/// other stored field is kept. Nested values (such as an `entries` array) are replaced
/// whole, never merged element by element.
///
/// ## Ordering
///
/// `list_all()` returns documents in a backend-defined order; callers must not rely on it.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the collection with its key.
    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError>;

    /// One document by key, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Create or merge into the document at `key`.
    async fn upsert_merge(&self, key: &str, fields: Document) -> Result<(), StoreError>;

    /// Remove the document at `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        (**self).list_all().await
    }

    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(key).await
    }

    async fn upsert_merge(&self, key: &str, fields: Document) -> Result<(), StoreError> {
        (**self).upsert_merge(key, fields).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }
}
