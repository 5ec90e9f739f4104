//! Inventory domain module (pantry ledger).
//!
//! This crate contains the ledger rules for pantry items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod search;
pub mod shelf;

pub use item::{Entry, InventoryItem, ItemRecord, MAX_ENTRY_QUANTITY, MAX_ITEM_QUANTITY, Removal};
pub use search::search;
pub use shelf::{MAX_TILES_PER_ITEM, ShelfItem, ShelfTile, shelf};
