use std::sync::Arc;

use thiserror::Error;

/// Stored bytes plus the content type given at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob storage lock poisoned")]
    LockPoisoned,
}

/// Blob storage addressed by slash-separated relative paths (e.g. `images/jam.png`).
///
/// Storing at an existing path overwrites it. `url()` must return the same URL for the
/// same path every time it is called.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), BlobError>;

    /// Stable retrieval URL of a stored blob; fails with `NotFound` for unknown paths.
    async fn url(&self, path: &str) -> Result<String, BlobError>;

    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError>;
}

#[async_trait::async_trait]
impl<S> BlobStore for Arc<S>
where
    S: BlobStore + ?Sized,
{
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), BlobError> {
        (**self).put(path, bytes, content_type).await
    }

    async fn url(&self, path: &str) -> Result<String, BlobError> {
        (**self).url(path).await
    }

    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        (**self).get(path).await
    }
}

/// Reject empty, absolute, or parent-escaping paths.
pub(crate) fn validate_path(path: &str) -> Result<(), BlobError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
