//! In-memory repositories.
//!
//! Intended for tests/dev; mirrors the Postgres semantics exactly,
//! including scoping, zero-row disambiguation, cascade delete, and
//! all-or-nothing batches. Not optimized for performance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{DomainError, DomainResult, ItemId, StoreId, UserId, Version, Violations};
use stockroom_items::{Item, ItemChange, NewItem, LOW_CAPACITY_THRESHOLD};
use stockroom_stores::{validate_name, NewStore, Store, StoreUpdate};

use super::{ItemRepository, StoreRepository, StoreScope};

#[derive(Debug, Default)]
struct State {
    stores: HashMap<i64, Store>,
    items: HashMap<i64, Item>,
    next_store_id: i64,
    next_item_id: i64,
}

impl State {
    fn alloc_store_id(&mut self) -> StoreId {
        self.next_store_id += 1;
        StoreId::from_row(self.next_store_id)
    }

    fn alloc_item_id(&mut self) -> ItemId {
        self.next_item_id += 1;
        ItemId::from_row(self.next_item_id)
    }
}

/// Shared in-memory backing state behind both repository handles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositories {
    state: Arc<RwLock<State>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stores(&self) -> InMemoryStoreRepository {
        InMemoryStoreRepository {
            state: self.state.clone(),
        }
    }

    pub fn items(&self) -> InMemoryItemRepository {
        InMemoryItemRepository {
            state: self.state.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryStoreRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Clone)]
pub struct InMemoryItemRepository {
    state: Arc<RwLock<State>>,
}

fn poisoned() -> DomainError {
    DomainError::unavailable("lock poisoned")
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn insert(&self, new_store: NewStore, owner: &UserId) -> DomainResult<Store> {
        let mut v = Violations::new();
        validate_name(&new_store.name, &mut v);
        if !v.is_empty() {
            return Err(DomainError::constraint(format!(
                "store name {:?} is out of bounds",
                new_store.name
            )));
        }

        let mut state = self.state.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let store = Store {
            id: state.alloc_store_id(),
            name: new_store.name,
            owner_id: owner.clone(),
            version: Version::generate(),
            created_at: now,
            modified_at: now,
        };
        state.stores.insert(store.id.as_i64(), store.clone());
        Ok(store)
    }

    async fn get(&self, store_id: StoreId, owner: &UserId) -> DomainResult<Store> {
        let state = self.state.read().map_err(|_| poisoned())?;
        state
            .stores
            .get(&store_id.as_i64())
            .filter(|s| &s.owner_id == owner)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    async fn list(&self, owner: &UserId) -> DomainResult<Vec<Store>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut stores: Vec<Store> = state
            .stores
            .values()
            .filter(|s| &s.owner_id == owner)
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.id);
        Ok(stores)
    }

    async fn update(
        &self,
        update: StoreUpdate,
        store_id: StoreId,
        owner: &UserId,
    ) -> DomainResult<Store> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let store = state
            .stores
            .get_mut(&store_id.as_i64())
            .filter(|s| &s.owner_id == owner)
            .ok_or_else(DomainError::not_found)?;

        if store.version != update.version {
            return Err(DomainError::conflict("store version mismatch"));
        }

        store.name = update.name;
        store.version = Version::generate();
        store.modified_at = Utc::now();
        Ok(store.clone())
    }

    async fn delete(&self, store_id: StoreId, owner: &UserId) -> DomainResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let reachable = state
            .stores
            .get(&store_id.as_i64())
            .is_some_and(|s| &s.owner_id == owner);
        if !reachable {
            return Err(DomainError::not_found());
        }

        state.stores.remove(&store_id.as_i64());
        state.items.retain(|_, item| item.store_id != store_id);
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, scope: &StoreScope, new_item: NewItem) -> DomainResult<Item> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        insert_locked(&mut state, scope.store_id(), &new_item)
    }

    async fn insert_batch(
        &self,
        scope: &StoreScope,
        new_items: Vec<NewItem>,
    ) -> DomainResult<Vec<Item>> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        // All-or-nothing: stage against a copy, swap on success.
        let mut staged = state.items.clone();
        let mut next_id = state.next_item_id;
        let mut inserted = Vec::with_capacity(new_items.len());

        for new_item in &new_items {
            check_backend_constraints(new_item)?;
            next_id += 1;
            let now = Utc::now();
            let item = Item {
                id: ItemId::from_row(next_id),
                name: new_item.name.clone(),
                current_capacity: new_item.current_capacity,
                store_id: scope.store_id(),
                version: Version::generate(),
                created_at: now,
                modified_at: now,
            };
            staged.insert(item.id.as_i64(), item.clone());
            inserted.push(item);
        }

        state.items = staged;
        state.next_item_id = next_id;
        Ok(inserted)
    }

    async fn get(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<Item> {
        let state = self.state.read().map_err(|_| poisoned())?;
        state
            .items
            .get(&item_id.as_i64())
            .filter(|i| i.store_id == scope.store_id())
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    async fn id_by_name(&self, scope: &StoreScope, name: &str) -> DomainResult<ItemId> {
        let state = self.state.read().map_err(|_| poisoned())?;
        state
            .items
            .values()
            .find(|i| i.store_id == scope.store_id() && i.name == name)
            .map(|i| i.id)
            .ok_or_else(DomainError::not_found)
    }

    async fn list(&self, scope: &StoreScope, only_low_capacity: bool) -> DomainResult<Vec<Item>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|i| i.store_id == scope.store_id())
            .filter(|i| !only_low_capacity || i.current_capacity <= LOW_CAPACITY_THRESHOLD)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn update(&self, scope: &StoreScope, change: ItemChange) -> DomainResult<Item> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        update_locked(&mut state.items, scope.store_id(), &change)
    }

    async fn update_batch(
        &self,
        scope: &StoreScope,
        changes: Vec<ItemChange>,
    ) -> DomainResult<Vec<Item>> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        // All-or-nothing: stage against a copy, swap on success.
        let mut staged = state.items.clone();
        let mut updated = Vec::with_capacity(changes.len());
        for change in &changes {
            updated.push(update_locked(&mut staged, scope.store_id(), change)?);
        }

        state.items = staged;
        Ok(updated)
    }

    async fn delete(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let matches = state
            .items
            .get(&item_id.as_i64())
            .is_some_and(|i| i.store_id == scope.store_id());
        if !matches {
            return Err(DomainError::not_found());
        }
        state.items.remove(&item_id.as_i64());
        Ok(())
    }
}

fn insert_locked(state: &mut State, store_id: StoreId, new_item: &NewItem) -> DomainResult<Item> {
    check_backend_constraints(new_item)?;

    let now = Utc::now();
    let item = Item {
        id: state.alloc_item_id(),
        name: new_item.name.clone(),
        current_capacity: new_item.current_capacity,
        store_id,
        version: Version::generate(),
        created_at: now,
        modified_at: now,
    };
    state.items.insert(item.id.as_i64(), item.clone());
    Ok(item)
}

fn update_locked(
    items: &mut HashMap<i64, Item>,
    store_id: StoreId,
    change: &ItemChange,
) -> DomainResult<Item> {
    let item = items
        .get_mut(&change.id.as_i64())
        .filter(|i| i.store_id == store_id)
        .ok_or_else(DomainError::not_found)?;

    if item.version != change.version {
        return Err(DomainError::conflict("item version mismatch"));
    }

    if let Some(name) = &change.name {
        item.name = name.clone();
    }
    if let Some(capacity) = change.current_capacity {
        item.current_capacity = capacity;
    }
    item.version = Version::generate();
    item.modified_at = Utc::now();
    Ok(item.clone())
}

/// The check constraints the database schema enforces.
fn check_backend_constraints(new_item: &NewItem) -> DomainResult<()> {
    if new_item.name.is_empty() {
        return Err(DomainError::constraint("item name must be non-empty"));
    }
    if new_item.current_capacity < 1 {
        return Err(DomainError::constraint("current_capacity must be >= 1"));
    }
    Ok(())
}
