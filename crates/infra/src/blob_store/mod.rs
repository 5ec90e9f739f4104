//! Blob storage boundary (image uploads).

pub mod in_memory;
pub mod local_fs;
pub mod r#trait;

pub use in_memory::InMemoryBlobStore;
pub use local_fs::LocalFsBlobStore;
pub use r#trait::{Blob, BlobError, BlobStore};
