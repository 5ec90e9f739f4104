//! Infrastructure layer: document store, blob store, config, ledger orchestration.

pub mod blob_store;
pub mod config;
pub mod document_store;
pub mod ledger;

pub use config::AppConfig;
pub use ledger::{ImageUpload, LedgerError, LedgerManager};
