//! Repository contracts and the verified-ownership capability.
//!
//! Two implementations exist per contract: Postgres (production) and
//! in-memory (tests/dev), mirroring each other's semantics exactly.

use async_trait::async_trait;

use stockroom_core::{DomainResult, ItemId, StoreId, UserId};
use stockroom_items::{Item, ItemChange, NewItem};
use stockroom_stores::{NewStore, Store, StoreUpdate};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryItemRepository, InMemoryRepositories, InMemoryStoreRepository};
pub use postgres::{PgItemRepository, PgStoreRepository};

/// Proof that the calling user currently owns a store.
///
/// Only repository implementations can construct this, and only after a
/// successful ownership lookup. Every item operation demands one, which makes
/// "forgot the ownership check" unrepresentable in new code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreScope {
    store_id: StoreId,
}

impl StoreScope {
    pub(crate) fn new(store_id: StoreId) -> Self {
        Self { store_id }
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }
}

/// Store persistence, scoped by `(store id, owner id)` pairs.
///
/// An id/owner mismatch is indistinguishable from "not found" to the
/// caller, so existence never leaks to non-owners.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Persist a new store for `owner`; assigns id, version, created_at.
    ///
    /// Re-checks the name bounds the validator already enforced; a failure
    /// here surfaces as `Constraint` since it indicates drift.
    async fn insert(&self, new_store: NewStore, owner: &UserId) -> DomainResult<Store>;

    /// Fetch a store reachable under the caller's ownership chain.
    async fn get(&self, store_id: StoreId, owner: &UserId) -> DomainResult<Store>;

    /// Prove ownership of `store_id`, yielding the capability item
    /// operations require.
    async fn verify(&self, store_id: StoreId, owner: &UserId) -> DomainResult<StoreScope> {
        let store = self.get(store_id, owner).await?;
        Ok(StoreScope::new(store.id))
    }

    /// All stores owned by the caller; empty when none.
    async fn list(&self, owner: &UserId) -> DomainResult<Vec<Store>>;

    /// Update name if `(id, owner, version)` all match; regenerates
    /// version/modified_at. Version mismatch on a reachable row is
    /// `Conflict`, anything else is `NotFound`.
    async fn update(
        &self,
        update: StoreUpdate,
        store_id: StoreId,
        owner: &UserId,
    ) -> DomainResult<Store>;

    /// Delete the store and its items in one atomic unit.
    async fn delete(&self, store_id: StoreId, owner: &UserId) -> DomainResult<()>;
}

/// Item persistence, scoped by `(item id, store id)` pairs.
///
/// Every operation requires a [`StoreScope`], so item mutation is only
/// reachable after the caller's ownership of the enclosing store has been
/// verified.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert(&self, scope: &StoreScope, new_item: NewItem) -> DomainResult<Item>;

    /// Insert every element in order within one atomic unit; if any element
    /// fails, nothing from the batch is persisted.
    async fn insert_batch(
        &self,
        scope: &StoreScope,
        new_items: Vec<NewItem>,
    ) -> DomainResult<Vec<Item>>;

    async fn get(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<Item>;

    /// Point lookup for name-based addressing. Name uniqueness within a
    /// store is assumed, not enforced.
    async fn id_by_name(&self, scope: &StoreScope, name: &str) -> DomainResult<ItemId>;

    /// All items of the store; when `only_low_capacity`, restricted to
    /// items at or below the low-stock threshold.
    async fn list(&self, scope: &StoreScope, only_low_capacity: bool) -> DomainResult<Vec<Item>>;

    /// Apply a partial change if `(item id, store id, version)` all match;
    /// omitted fields are left unchanged. Regenerates version/modified_at.
    async fn update(&self, scope: &StoreScope, change: ItemChange) -> DomainResult<Item>;

    /// Apply every change within one atomic unit; if any element fails,
    /// nothing from the batch is persisted.
    async fn update_batch(
        &self,
        scope: &StoreScope,
        changes: Vec<ItemChange>,
    ) -> DomainResult<Vec<Item>>;

    async fn delete(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<()>;
}
