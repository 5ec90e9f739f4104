//! Values persisted as one document per key.

/// Something stored under a stable document key.
pub trait Keyed {
    type Key: AsRef<str> + Clone + Eq + core::fmt::Debug;

    fn key(&self) -> &Self::Key;

    /// The key as the document store sees it.
    fn document_key(&self) -> &str {
        self.key().as_ref()
    }
}
