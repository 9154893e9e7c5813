//! Postgres-backed repositories.
//!
//! Tenant isolation is structural: every statement filters by the scoping
//! keys (`user_id` for stores, `store_id` for items), so cross-tenant access
//! is impossible to express. Concurrency tokens are regenerated server-side
//! (`uuid_generate_v4()`), and a zero-row mutation is disambiguated into
//! `Conflict` vs `NotFound` with a scoped existence probe.
//!
//! ## Error mapping
//!
//! | Postgres error code | DomainError   | Scenario                                |
//! |---------------------|---------------|-----------------------------------------|
//! | `23505`             | `Conflict`    | Unique violation under concurrency      |
//! | `23502`, `23514`    | `Constraint`  | Null/check constraint (validator drift) |
//! | `23503`             | `NotFound`    | FK violation (owning store vanished)    |
//! | pool/io/timeout     | `Unavailable` | Backing store unreachable               |

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{
    DomainError, DomainResult, ItemId, StoreId, UserId, Version, Violations,
};
use stockroom_items::{Item, ItemChange, NewItem};
use stockroom_stores::{validate_name, NewStore, Store, StoreUpdate};

use crate::config::DEFAULT_OP_BUDGET;

use super::{ItemRepository, StoreRepository, StoreScope};

/// Postgres-backed store repository.
#[derive(Debug, Clone)]
pub struct PgStoreRepository {
    pool: Arc<PgPool>,
    budget: Duration,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            budget: DEFAULT_OP_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

/// Postgres-backed item repository.
#[derive(Debug, Clone)]
pub struct PgItemRepository {
    pool: Arc<PgPool>,
    budget: Duration,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            budget: DEFAULT_OP_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

/// Bound the wait for an in-flight operation; on expiry the enclosing
/// transaction is dropped (rolled back) and the caller sees `Unavailable`.
async fn with_budget<T>(
    budget: Duration,
    operation: &str,
    fut: impl Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::unavailable(format!(
            "{operation} exceeded the {}s wait budget",
            budget.as_secs()
        ))),
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    #[instrument(skip(self, new_store), fields(owner = %owner), err)]
    async fn insert(&self, new_store: NewStore, owner: &UserId) -> DomainResult<Store> {
        // Defense in depth: the validator should have caught this upstream,
        // so a failure here is validator/backend drift.
        let mut v = Violations::new();
        validate_name(&new_store.name, &mut v);
        if !v.is_empty() {
            return Err(DomainError::constraint(format!(
                "store name {:?} is out of bounds",
                new_store.name
            )));
        }

        with_budget(self.budget, "store.insert", async {
            let row = sqlx::query(
                r#"
                INSERT INTO stores (name, user_id)
                VALUES ($1, $2)
                RETURNING id, name, user_id, version, created_at, modified_at
                "#,
            )
            .bind(&new_store.name)
            .bind(owner.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store.insert", e))?;

            StoreRow::from_row(&row)
                .map(Into::into)
                .map_err(|e| map_sqlx_error("store.insert", e))
        })
        .await
    }

    #[instrument(skip(self), fields(store_id = %store_id, owner = %owner), err)]
    async fn get(&self, store_id: StoreId, owner: &UserId) -> DomainResult<Store> {
        with_budget(self.budget, "store.get", async {
            let row = sqlx::query(
                r#"
                SELECT id, name, user_id, version, created_at, modified_at
                FROM stores
                WHERE id = $1 AND user_id = $2
                "#,
            )
            .bind(store_id.as_i64())
            .bind(owner.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store.get", e))?;

            match row {
                Some(row) => StoreRow::from_row(&row)
                    .map(Into::into)
                    .map_err(|e| map_sqlx_error("store.get", e)),
                None => Err(DomainError::not_found()),
            }
        })
        .await
    }

    #[instrument(skip(self), fields(owner = %owner), err)]
    async fn list(&self, owner: &UserId) -> DomainResult<Vec<Store>> {
        with_budget(self.budget, "store.list", async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, user_id, version, created_at, modified_at
                FROM stores
                WHERE user_id = $1
                ORDER BY id ASC
                "#,
            )
            .bind(owner.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store.list", e))?;

            let mut stores = Vec::with_capacity(rows.len());
            for row in rows {
                let store = StoreRow::from_row(&row)
                    .map_err(|e| map_sqlx_error("store.list", e))?;
                stores.push(store.into());
            }
            Ok(stores)
        })
        .await
    }

    #[instrument(skip(self, update), fields(store_id = %store_id, owner = %owner), err)]
    async fn update(
        &self,
        update: StoreUpdate,
        store_id: StoreId,
        owner: &UserId,
    ) -> DomainResult<Store> {
        with_budget(self.budget, "store.update", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("store.update", e))?;

            let row = sqlx::query(
                r#"
                UPDATE stores
                SET name = $1, version = uuid_generate_v4(), modified_at = NOW()
                WHERE id = $2 AND user_id = $3 AND version = $4
                RETURNING id, name, user_id, version, created_at, modified_at
                "#,
            )
            .bind(&update.name)
            .bind(store_id.as_i64())
            .bind(owner.as_str())
            .bind(update.version.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("store.update", e))?;

            match row {
                Some(row) => {
                    let store: Store = StoreRow::from_row(&row)
                        .map_err(|e| map_sqlx_error("store.update", e))?
                        .into();
                    tx.commit()
                        .await
                        .map_err(|e| map_sqlx_error("store.update", e))?;
                    Ok(store)
                }
                None => {
                    // Zero rows matched: a reachable row means the version
                    // was stale, anything else is outside the caller's
                    // ownership chain.
                    let reachable =
                        store_is_reachable(&mut tx, store_id, owner, "store.update").await?;
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("store.update", e))?;
                    if reachable {
                        Err(DomainError::conflict("store version mismatch"))
                    } else {
                        Err(DomainError::not_found())
                    }
                }
            }
        })
        .await
    }

    #[instrument(skip(self), fields(store_id = %store_id, owner = %owner), err)]
    async fn delete(&self, store_id: StoreId, owner: &UserId) -> DomainResult<()> {
        with_budget(self.budget, "store.delete", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("store.delete", e))?;

            if !store_is_reachable(&mut tx, store_id, owner, "store.delete").await? {
                return Err(DomainError::not_found());
            }

            // Explicit cascade: items first, then the store, one atomic unit.
            sqlx::query("DELETE FROM items WHERE store_id = $1")
                .bind(store_id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("store.delete", e))?;

            let result = sqlx::query("DELETE FROM stores WHERE id = $1 AND user_id = $2")
                .bind(store_id.as_i64())
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("store.delete", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found());
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("store.delete", e))
        })
        .await
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self, new_item), fields(store_id = %scope.store_id()), err)]
    async fn insert(&self, scope: &StoreScope, new_item: NewItem) -> DomainResult<Item> {
        with_budget(self.budget, "item.insert", async {
            let row = sqlx::query(
                r#"
                INSERT INTO items (name, current_capacity, store_id)
                VALUES ($1, $2, $3)
                RETURNING id, name, current_capacity, store_id, version, created_at, modified_at
                "#,
            )
            .bind(&new_item.name)
            .bind(new_item.current_capacity)
            .bind(scope.store_id().as_i64())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("item.insert", e))?;

            ItemRow::from_row(&row)
                .map(Into::into)
                .map_err(|e| map_sqlx_error("item.insert", e))
        })
        .await
    }

    #[instrument(skip(self, new_items), fields(store_id = %scope.store_id(), batch = new_items.len()), err)]
    async fn insert_batch(
        &self,
        scope: &StoreScope,
        new_items: Vec<NewItem>,
    ) -> DomainResult<Vec<Item>> {
        with_budget(self.budget, "item.insert_batch", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("item.insert_batch", e))?;

            let mut inserted = Vec::with_capacity(new_items.len());
            for new_item in &new_items {
                let row = sqlx::query(
                    r#"
                    INSERT INTO items (name, current_capacity, store_id)
                    VALUES ($1, $2, $3)
                    RETURNING id, name, current_capacity, store_id, version, created_at, modified_at
                    "#,
                )
                .bind(&new_item.name)
                .bind(new_item.current_capacity)
                .bind(scope.store_id().as_i64())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("item.insert_batch", e))?;

                let item: Item = ItemRow::from_row(&row)
                    .map_err(|e| map_sqlx_error("item.insert_batch", e))?
                    .into();
                inserted.push(item);
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("item.insert_batch", e))?;
            Ok(inserted)
        })
        .await
    }

    #[instrument(skip(self), fields(item_id = %item_id, store_id = %scope.store_id()), err)]
    async fn get(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<Item> {
        with_budget(self.budget, "item.get", async {
            let row = sqlx::query(
                r#"
                SELECT id, name, current_capacity, store_id, version, created_at, modified_at
                FROM items
                WHERE id = $1 AND store_id = $2
                "#,
            )
            .bind(item_id.as_i64())
            .bind(scope.store_id().as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("item.get", e))?;

            match row {
                Some(row) => ItemRow::from_row(&row)
                    .map(Into::into)
                    .map_err(|e| map_sqlx_error("item.get", e)),
                None => Err(DomainError::not_found()),
            }
        })
        .await
    }

    #[instrument(skip(self), fields(store_id = %scope.store_id(), name = %name), err)]
    async fn id_by_name(&self, scope: &StoreScope, name: &str) -> DomainResult<ItemId> {
        with_budget(self.budget, "item.id_by_name", async {
            let row = sqlx::query(
                r#"
                SELECT id
                FROM items
                WHERE name = $1 AND store_id = $2
                "#,
            )
            .bind(name)
            .bind(scope.store_id().as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("item.id_by_name", e))?;

            match row {
                Some(row) => {
                    let id: i64 = row
                        .try_get("id")
                        .map_err(|e| map_sqlx_error("item.id_by_name", e))?;
                    Ok(ItemId::from_row(id))
                }
                None => Err(DomainError::not_found()),
            }
        })
        .await
    }

    #[instrument(skip(self), fields(store_id = %scope.store_id(), only_low_capacity), err)]
    async fn list(&self, scope: &StoreScope, only_low_capacity: bool) -> DomainResult<Vec<Item>> {
        with_budget(self.budget, "item.list", async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, current_capacity, store_id, version, created_at, modified_at
                FROM items
                WHERE store_id = $1 AND (current_capacity <= $2 OR NOT $3)
                ORDER BY id ASC
                "#,
            )
            .bind(scope.store_id().as_i64())
            .bind(stockroom_items::LOW_CAPACITY_THRESHOLD)
            .bind(only_low_capacity)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("item.list", e))?;

            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                let item = ItemRow::from_row(&row).map_err(|e| map_sqlx_error("item.list", e))?;
                items.push(item.into());
            }
            Ok(items)
        })
        .await
    }

    #[instrument(skip(self, change), fields(item_id = %change.id, store_id = %scope.store_id()), err)]
    async fn update(&self, scope: &StoreScope, change: ItemChange) -> DomainResult<Item> {
        with_budget(self.budget, "item.update", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("item.update", e))?;

            let item = update_item_in_tx(&mut tx, scope.store_id(), &change).await?;

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("item.update", e))?;
            Ok(item)
        })
        .await
    }

    #[instrument(skip(self, changes), fields(store_id = %scope.store_id(), batch = changes.len()), err)]
    async fn update_batch(
        &self,
        scope: &StoreScope,
        changes: Vec<ItemChange>,
    ) -> DomainResult<Vec<Item>> {
        with_budget(self.budget, "item.update_batch", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("item.update_batch", e))?;

            let mut updated = Vec::with_capacity(changes.len());
            for change in &changes {
                let item = update_item_in_tx(&mut tx, scope.store_id(), change).await?;
                updated.push(item);
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("item.update_batch", e))?;
            Ok(updated)
        })
        .await
    }

    #[instrument(skip(self), fields(item_id = %item_id, store_id = %scope.store_id()), err)]
    async fn delete(&self, scope: &StoreScope, item_id: ItemId) -> DomainResult<()> {
        with_budget(self.budget, "item.delete", async {
            let result = sqlx::query("DELETE FROM items WHERE id = $1 AND store_id = $2")
                .bind(item_id.as_i64())
                .bind(scope.store_id().as_i64())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("item.delete", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found());
            }
            Ok(())
        })
        .await
    }
}

/// Merge a partial change onto the current row and apply it with the
/// version precondition, all inside the caller's transaction.
async fn update_item_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: StoreId,
    change: &ItemChange,
) -> DomainResult<Item> {
    let current = sqlx::query(
        r#"
        SELECT id, name, current_capacity, store_id, version, created_at, modified_at
        FROM items
        WHERE id = $1 AND store_id = $2
        "#,
    )
    .bind(change.id.as_i64())
    .bind(store_id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("item.update", e))?;

    let current: Item = match current {
        Some(row) => ItemRow::from_row(&row)
            .map_err(|e| map_sqlx_error("item.update", e))?
            .into(),
        None => return Err(DomainError::not_found()),
    };

    let name = change.name.clone().unwrap_or(current.name);
    let capacity = change.current_capacity.unwrap_or(current.current_capacity);

    let row = sqlx::query(
        r#"
        UPDATE items
        SET name = $1, current_capacity = $2, version = uuid_generate_v4(), modified_at = NOW()
        WHERE id = $3 AND store_id = $4 AND version = $5
        RETURNING id, name, current_capacity, store_id, version, created_at, modified_at
        "#,
    )
    .bind(&name)
    .bind(capacity)
    .bind(change.id.as_i64())
    .bind(store_id.as_i64())
    .bind(change.version.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("item.update", e))?;

    match row {
        Some(row) => ItemRow::from_row(&row)
            .map(Into::into)
            .map_err(|e| map_sqlx_error("item.update", e)),
        // The row was reachable moments ago in this transaction, so a zero
        // match means the presented version is stale.
        None => Err(DomainError::conflict("item version mismatch")),
    }
}

/// Scoped existence probe: is the store reachable under the caller's
/// ownership chain right now?
async fn store_is_reachable(
    tx: &mut Transaction<'_, Postgres>,
    store_id: StoreId,
    owner: &UserId,
    operation: &str,
) -> DomainResult<bool> {
    let row = sqlx::query("SELECT 1 FROM stores WHERE id = $1 AND user_id = $2")
        .bind(store_id.as_i64())
        .bind(owner.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

    Ok(row.is_some())
}

/// Map sqlx errors onto the domain taxonomy.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DomainError::conflict(msg),
                Some("23502") | Some("23514") => DomainError::constraint(msg),
                Some("23503") => DomainError::not_found(),
                _ => DomainError::unavailable(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            DomainError::unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            DomainError::unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => DomainError::unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::RowNotFound => DomainError::not_found(),
        other => DomainError::unavailable(format!("sqlx error in {operation}: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct StoreRow {
    id: i64,
    name: String,
    user_id: String,
    version: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoreRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoreRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            user_id: row.try_get("user_id")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: StoreId::from_row(row.id),
            name: row.name,
            owner_id: UserId::new(row.user_id),
            version: Version::from_uuid(row.version),
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[derive(Debug)]
struct ItemRow {
    id: i64,
    name: String,
    current_capacity: i32,
    store_id: i64,
    version: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            current_capacity: row.try_get("current_capacity")?,
            store_id: row.try_get("store_id")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: ItemId::from_row(row.id),
            name: row.name,
            current_capacity: row.current_capacity,
            store_id: StoreId::from_row(row.store_id),
            version: Version::from_uuid(row.version),
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}
