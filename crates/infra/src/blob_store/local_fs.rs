//! Filesystem blob store: one file per path under a root directory.

use std::path::PathBuf;

use super::r#trait::{Blob, BlobError, BlobStore, join_url, validate_path};

/// Stores blobs as files under `root`, handing out URLs below `public_base_url`.
///
/// Content types are not persisted; `get()` infers a few common image types from the
/// file extension.
#[derive(Debug, Clone)]
pub struct LocalFsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, BlobError> {
        validate_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }
}

fn content_type_for(path: &str) -> Option<String> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(ct.to_string())
}

#[async_trait::async_trait]
impl BlobStore for LocalFsBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> Result<(), BlobError> {
        let file = self.file_path(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file, bytes).await?;
        tracing::debug!(path, "blob stored");
        Ok(())
    }

    async fn url(&self, path: &str) -> Result<String, BlobError> {
        let file = self.file_path(path)?;
        if !tokio::fs::try_exists(&file).await? {
            return Err(BlobError::NotFound(path.to_string()));
        }
        Ok(join_url(&self.public_base_url, path))
    }

    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        let file = self.file_path(path)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(Blob {
                bytes,
                content_type: content_type_for(path),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
