use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainResult, Entity, ItemId, StoreId, Version, Violations};

/// Items at or below this capacity show up in low-stock warning listings.
pub const LOW_CAPACITY_THRESHOLD: i32 = 1;

/// An item belonging to exactly one store.
///
/// Items carry no owner field; ownership is transitive through the store,
/// so the foreign key is never exposed in serialized output and never
/// settable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub current_capacity: i32,
    #[serde(skip_serializing)]
    pub store_id: StoreId,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Item {
    pub fn is_low_capacity(&self) -> bool {
        self.current_capacity <= LOW_CAPACITY_THRESHOLD
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating an item. The owning store id is never part of the
/// payload; it is injected from the validated store scope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub current_capacity: i32,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        v.check(!self.name.trim().is_empty(), "name", "required", "");
        v.check(
            self.current_capacity >= 1,
            "current_capacity",
            "min",
            self.current_capacity.to_string(),
        );
        v.finish()
    }
}

/// Payload for a partial item update.
///
/// Target id and version token are mandatory; omitted fields mean "leave
/// unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemChange {
    pub id: ItemId,
    pub name: Option<String>,
    pub current_capacity: Option<i32>,
    pub version: Version,
}

impl ItemChange {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        if let Some(name) = &self.name {
            v.check(!name.trim().is_empty(), "name", "required", "");
        }
        if let Some(capacity) = self.current_capacity {
            v.check(capacity >= 1, "current_capacity", "min", capacity.to_string());
        }
        v.finish()
    }
}
