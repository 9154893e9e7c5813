//! Read-side capacity report.
//!
//! Pure projection over a listed item set; carries no invariants of its own.

use std::collections::BTreeMap;

use serde::Serialize;

use stockroom_core::Version;

use crate::item::Item;

/// Per-store capacity report used by the warning/overview views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CapacityReport {
    /// Display labels, one per item: `"{name} ({capacity})"`.
    pub options: Vec<String>,
    /// Current capacity keyed by item name.
    pub capacities: BTreeMap<String, i32>,
    /// Concurrency token keyed by item name, so a view can submit updates
    /// without a second fetch.
    pub versions: BTreeMap<String, Version>,
}

impl CapacityReport {
    pub fn from_items(items: &[Item]) -> Self {
        let mut report = Self::default();

        for item in items {
            report
                .options
                .push(format!("{} ({})", item.name, item.current_capacity));
            report.capacities.insert(item.name.clone(), item.current_capacity);
            report.versions.insert(item.name.clone(), item.version);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::{ItemId, StoreId};

    fn item(id: i64, name: &str, capacity: i32) -> Item {
        let now = Utc::now();
        Item {
            id: ItemId::from_row(id),
            name: name.to_string(),
            current_capacity: capacity,
            store_id: StoreId::from_row(1),
            version: Version::generate(),
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn empty_items_produce_empty_report() {
        let report = CapacityReport::from_items(&[]);
        assert!(report.options.is_empty());
        assert!(report.capacities.is_empty());
        assert!(report.versions.is_empty());
    }

    #[test]
    fn labels_combine_name_and_capacity() {
        let items = [item(1, "Rice", 5), item(2, "Beans", 1)];
        let report = CapacityReport::from_items(&items);

        assert_eq!(report.options, vec!["Rice (5)", "Beans (1)"]);
        assert_eq!(report.capacities["Rice"], 5);
        assert_eq!(report.capacities["Beans"], 1);
        assert_eq!(report.versions["Rice"], items[0].version);
    }
}
