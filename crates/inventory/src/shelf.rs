//! Shelf view: one tile per unit on hand, grouped by item and capped per item.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::item::InventoryItem;

/// Tiles drawn per item; units beyond this are only counted in `hidden`.
pub const MAX_TILES_PER_ITEM: usize = 200;

/// One unit on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfTile {
    /// `<entry timestamp millis>-<unit index within the entry>`.
    pub key: String,
    /// First character of the display name.
    pub label: String,
    pub entered_at: DateTime<Utc>,
    pub image_url: String,
}

/// All tiles for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfItem {
    pub name: String,
    pub display_name: String,
    /// Sum of entry quantities.
    pub total: u64,
    /// Oldest units first, at most [`MAX_TILES_PER_ITEM`].
    pub tiles: Vec<ShelfTile>,
    /// Units in `total` without a tile.
    pub hidden: u64,
}

pub fn shelf(items: &[InventoryItem]) -> Vec<ShelfItem> {
    items.iter().map(shelf_item).collect()
}

fn shelf_item(item: &InventoryItem) -> ShelfItem {
    let display_name = item.name().display_name();
    let label: String = display_name.chars().take(1).collect();

    let tiles = item
        .entries()
        .iter()
        .flat_map(|entry| {
            let millis = entry.timestamp.timestamp_millis();
            let label = label.clone();
            (0..entry.quantity).map(move |idx| ShelfTile {
                key: format!("{millis}-{idx}"),
                label: label.clone(),
                entered_at: entry.timestamp,
                image_url: entry.image_url.clone(),
            })
        })
        .take(MAX_TILES_PER_ITEM)
        .collect::<Vec<_>>();

    let total = item.entries_total();
    ShelfItem {
        name: item.name().to_string(),
        display_name,
        total,
        hidden: total.saturating_sub(tiles.len() as u64),
        tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Entry, ItemRecord};
    use chrono::TimeZone;
    use pantry_core::ItemName;

    #[test]
    fn one_tile_per_unit_with_entry_keys() {
        let t1 = Utc.timestamp_millis_opt(1_000).unwrap();
        let t2 = Utc.timestamp_millis_opt(2_000).unwrap();
        let mut item = InventoryItem::create(
            ItemName::new("apples").unwrap(),
            Entry::new(2, None, t1).unwrap(),
        );
        item.record_addition(Entry::new(1, Some("u".to_string()), t2).unwrap())
            .unwrap();

        let view = shelf(&[item]);
        assert_eq!(view.len(), 1);
        let apples = &view[0];
        assert_eq!(apples.display_name, "Apples");
        assert_eq!(apples.total, 3);

        let keys: Vec<&str> = apples.tiles.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["1000-0", "1000-1", "2000-0"]);
        assert!(apples.tiles.iter().all(|t| t.label == "A"));
        assert_eq!(apples.tiles[2].image_url, "u");
        assert_eq!(apples.tiles[2].entered_at, t2);
        assert_eq!(apples.hidden, 0);
    }

    #[test]
    fn tiles_are_capped_for_oversized_items() {
        let t = Utc.timestamp_millis_opt(5_000).unwrap();
        let item = InventoryItem::from_record(
            ItemName::new("rice").unwrap(),
            ItemRecord {
                quantity: 1_000_000_000_001,
                entries: vec![
                    Entry { quantity: 1_000_000_000_000, ..Entry::new(1, None, t).unwrap() },
                    Entry::new(1, None, t).unwrap(),
                ],
            },
        );

        let view = shelf(&[item]);
        let rice = &view[0];
        assert_eq!(rice.tiles.len(), MAX_TILES_PER_ITEM);
        assert_eq!(rice.total, 1_000_000_000_001);
        assert_eq!(rice.hidden, 1_000_000_000_001 - MAX_TILES_PER_ITEM as u64);
        assert_eq!(rice.tiles.last().unwrap().key, format!("5000-{}", MAX_TILES_PER_ITEM - 1));
    }
}
