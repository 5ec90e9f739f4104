//! Name search over the mirrored inventory list.

use crate::item::InventoryItem;

/// Items whose name contains `query`, ignoring case.
///
/// An empty query matches nothing; callers fall back to the full list in that case.
pub fn search<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name().as_str().to_lowercase().contains(&needle))
        .collect()
}
