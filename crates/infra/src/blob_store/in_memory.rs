use std::collections::HashMap;
use std::sync::RwLock;

use super::r#trait::{Blob, BlobError, BlobStore, join_url, validate_path};

/// In-memory blob store for tests/dev.
///
/// URLs point at `base_url`; serving them is up to the caller.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, Blob>>,
}

impl InMemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), BlobError> {
        validate_path(path)?;
        let mut blobs = self.blobs.write().map_err(|_| BlobError::LockPoisoned)?;
        blobs.insert(
            path.to_string(),
            Blob {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn url(&self, path: &str) -> Result<String, BlobError> {
        let blobs = self.blobs.read().map_err(|_| BlobError::LockPoisoned)?;
        if !blobs.contains_key(path) {
            return Err(BlobError::NotFound(path.to_string()));
        }
        Ok(join_url(&self.base_url, path))
    }

    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        let blobs = self.blobs.read().map_err(|_| BlobError::LockPoisoned)?;
        Ok(blobs.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_url_and_get() {
        let store = InMemoryBlobStore::new("http://localhost:8080/blobs");
        store
            .put("images/jam.png", vec![1, 2, 3], Some("image/png"))
            .await
            .unwrap();

        let url = store.url("images/jam.png").await.unwrap();
        assert_eq!(url, "http://localhost:8080/blobs/images/jam.png");
        assert_eq!(store.url("images/jam.png").await.unwrap(), url);

        let blob = store.get("images/jam.png").await.unwrap().unwrap();
        assert_eq!(blob.bytes, vec![1, 2, 3]);
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn url_for_unknown_path_fails() {
        let store = InMemoryBlobStore::new("http://x");
        assert!(matches!(store.url("images/none.png").await, Err(BlobError::NotFound(_))));
    }
}
