use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, ItemName, Keyed};

/// Most units a single add-operation may record.
pub const MAX_ENTRY_QUANTITY: u64 = 10_000;

/// Most units an item may hold in total.
pub const MAX_ITEM_QUANTITY: u64 = 100_000;

/// One discrete addition event: quantity, optional image, timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub quantity: u64,

    /// URL of the stored image, or an empty string when the entry has none.
    #[serde(rename = "imageURL", default)]
    pub image_url: String,

    /// Stored as milliseconds since the Unix epoch.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Build an entry for one add-operation.
    ///
    /// The timestamp is truncated to millisecond resolution so the in-memory entry
    /// compares equal to what the document store hands back.
    pub fn new(
        quantity: u64,
        image_url: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::check_quantity(quantity)?;
        let timestamp =
            DateTime::from_timestamp_millis(recorded_at.timestamp_millis()).unwrap_or(recorded_at);
        Ok(Self {
            quantity,
            image_url: image_url.unwrap_or_default(),
            timestamp,
        })
    }

    /// Accept `1..=MAX_ENTRY_QUANTITY`.
    pub fn check_quantity(quantity: u64) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        if quantity > MAX_ENTRY_QUANTITY {
            return Err(DomainError::validation(format!(
                "quantity {quantity} exceeds the per-add limit of {MAX_ENTRY_QUANTITY}"
            )));
        }
        Ok(())
    }
}

/// Persisted fields of an item document (the name is the document key).
///
/// Documents written by older clients may lack `entries`; those decode as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub quantity: u64,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A uniquely-named pantry product with aggregate quantity and entry history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    name: ItemName,
    quantity: u64,
    entries: Vec<Entry>,
}

/// Outcome of taking one unit out of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The last unit is gone; the document must be deleted.
    Delete,
    /// The item keeps existing with the given state.
    Update(InventoryItem),
    /// Nothing can be written: no stored entry has a unit to take.
    Unchanged,
}

impl InventoryItem {
    /// First add-operation for a name.
    pub fn create(name: ItemName, entry: Entry) -> Self {
        Self {
            name,
            quantity: entry.quantity,
            entries: vec![entry],
        }
    }

    /// Rebuild an item from its stored document.
    pub fn from_record(name: ItemName, record: ItemRecord) -> Self {
        Self {
            name,
            quantity: record.quantity,
            entries: record.entries,
        }
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            quantity: self.quantity,
            entries: self.entries.clone(),
        }
    }

    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Sum of entry quantities (what the shelf shows as the total).
    ///
    /// Saturates, since stored documents are not bounded by the add limits.
    pub fn entries_total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.quantity))
    }

    /// The aggregate quantity once `added` more units are recorded.
    pub fn quantity_after_adding(&self, added: u64) -> DomainResult<u64> {
        self.quantity
            .checked_add(added)
            .filter(|q| *q <= MAX_ITEM_QUANTITY)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "'{}' would exceed the item limit of {MAX_ITEM_QUANTITY} units",
                    self.name
                ))
            })
    }

    /// Append a new entry and grow the aggregate quantity by its amount.
    ///
    /// Rejected when the new total would exceed [`MAX_ITEM_QUANTITY`].
    pub fn record_addition(&mut self, entry: Entry) -> DomainResult<()> {
        let quantity = self.quantity_after_adding(entry.quantity)?;
        self.quantity = quantity;
        self.entries.push(entry);
        Ok(())
    }

    /// Take one unit out of the item.
    ///
    /// - quantity of 1 (or a malformed 0) deletes the item outright, whatever the entries say
    /// - otherwise the entries are scanned in stored order and the first one that can
    ///   absorb the decrement does: an entry above 1 loses one unit, an entry at exactly 1
    ///   is dropped; entries at 0 are skipped
    pub fn remove_one(mut self) -> Removal {
        if self.quantity <= 1 {
            return Removal::Delete;
        }
        if self.entries.is_empty() {
            return Removal::Unchanged;
        }

        let Some(idx) = self.entries.iter().position(|e| e.quantity > 0) else {
            return Removal::Unchanged;
        };
        if self.entries[idx].quantity > 1 {
            self.entries[idx].quantity -= 1;
        } else {
            self.entries.remove(idx);
        }

        self.quantity -= 1;
        Removal::Update(self)
    }

    /// Check the ledger invariants of a stored item.
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.quantity == 0 {
            return Err(DomainError::invariant("stored item has zero quantity"));
        }
        if self.entries.is_empty() {
            return Err(DomainError::invariant("stored item has no entries"));
        }
        let total = self.entries_total();
        if total != self.quantity {
            return Err(DomainError::invariant(format!(
                "quantity {} does not match entries total {total}",
                self.quantity
            )));
        }
        Ok(())
    }
}

impl Keyed for InventoryItem {
    type Key = ItemName;

    fn key(&self) -> &ItemName {
        &self.name
    }
}
