use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainResult, Entity, StoreId, UserId, Version, Violations};

/// Name length bounds, enforced both here and by the backend check
/// constraint.
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 15;

/// A store owned by exactly one user.
///
/// The owner key is a scoping parameter for every repository operation and
/// is never exposed in serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(skip_serializing)]
    pub owner_id: UserId,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStore {
    pub name: String,
}

impl NewStore {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        validate_name(&self.name, &mut v);
        v.finish()
    }
}

/// Payload for updating a store.
///
/// The version token is the optimistic-concurrency precondition; presence is
/// enforced by the type, staleness by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreUpdate {
    pub name: String,
    pub version: Version,
}

impl StoreUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        validate_name(&self.name, &mut v);
        v.finish()
    }
}

/// Store name rules: required, char length in [`NAME_MIN_LEN`, `NAME_MAX_LEN`].
pub fn validate_name(name: &str, v: &mut Violations) {
    let len = name.chars().count();
    if len == 0 {
        v.push("name", "required", "");
        return;
    }
    v.check(len >= NAME_MIN_LEN, "name", "min_length", NAME_MIN_LEN.to_string());
    v.check(len <= NAME_MAX_LEN, "name", "max_length", NAME_MAX_LEN.to_string());
}
