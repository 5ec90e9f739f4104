//! Keyed document store boundary.
//!
//! Documents are JSON objects addressed by key inside one collection. Writes merge
//! top-level fields into the stored document instead of replacing it.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{Document, DocumentStore, StoreError};

/// Collection holding one document per pantry item.
pub const INVENTORY_COLLECTION: &str = "inventory";
