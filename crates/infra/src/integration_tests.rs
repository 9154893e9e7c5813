//! Repository behavior tests against the in-memory backend.
//!
//! The in-memory implementation mirrors the Postgres semantics, so these
//! pin the contract both backends must satisfy.

use stockroom_core::{DomainError, ItemId, StoreId, UserId, Version};
use stockroom_items::{ItemChange, NewItem};
use stockroom_stores::{NewStore, StoreUpdate};

use crate::repository::{
    InMemoryItemRepository, InMemoryRepositories, InMemoryStoreRepository, ItemRepository,
    StoreRepository, StoreScope,
};

fn repos() -> (InMemoryStoreRepository, InMemoryItemRepository) {
    let backing = InMemoryRepositories::new();
    (backing.stores(), backing.items())
}

fn new_store(name: &str) -> NewStore {
    NewStore {
        name: name.to_string(),
    }
}

fn new_item(name: &str, capacity: i32) -> NewItem {
    NewItem {
        name: name.to_string(),
        current_capacity: capacity,
    }
}

async fn seeded_scope(
    stores: &InMemoryStoreRepository,
    owner: &UserId,
    name: &str,
) -> StoreScope {
    let store = stores.insert(new_store(name), owner).await.unwrap();
    stores.verify(store.id, owner).await.unwrap()
}

#[tokio::test]
async fn get_is_scoped_to_the_owner() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");
    let u2 = UserId::new("u2");

    let store = stores.insert(new_store("Pantry"), &u1).await.unwrap();

    let fetched = stores.get(store.id, &u1).await.unwrap();
    assert_eq!(fetched, store);

    // Owner mismatch is indistinguishable from absence.
    assert_eq!(
        stores.get(store.id, &u2).await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn list_returns_empty_for_unknown_owner() {
    let (stores, _) = repos();
    assert!(stores.list(&UserId::new("nobody")).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_only_the_callers_stores() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");
    let u2 = UserId::new("u2");

    stores.insert(new_store("Pantry"), &u1).await.unwrap();
    stores.insert(new_store("Cellar"), &u1).await.unwrap();
    stores.insert(new_store("Garage"), &u2).await.unwrap();

    let listed = stores.list(&u1).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| s.owner_id == u1));
}

#[tokio::test]
async fn insert_assigns_sequential_ids_starting_at_one() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");

    let first = stores.insert(new_store("Pantry"), &u1).await.unwrap();
    let second = stores.insert(new_store("Cellar"), &u1).await.unwrap();

    assert_eq!(first.id, StoreId::from_row(1));
    assert_eq!(second.id, StoreId::from_row(2));
}

#[tokio::test]
async fn out_of_bounds_name_is_a_constraint_violation() {
    // Defense in depth: the validator runs upstream, so the repository
    // reports drift as Constraint, not Validation.
    let (stores, _) = repos();
    let err = stores
        .insert(new_store("ab"), &UserId::new("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Constraint(_)));
}

#[tokio::test]
async fn stale_version_update_conflicts_after_a_successful_one() {
    // Scenario: "Pantry" -> "Larder" with v0 succeeds, repeating with v0
    // conflicts.
    let (stores, _) = repos();
    let u1 = UserId::new("u1");

    let store = stores.insert(new_store("Pantry"), &u1).await.unwrap();
    let v0 = store.version;

    let updated = stores
        .update(
            StoreUpdate {
                name: "Larder".to_string(),
                version: v0,
            },
            store.id,
            &u1,
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Larder");
    assert_ne!(updated.version, v0);
    assert_eq!(updated.created_at, store.created_at);

    let err = stores
        .update(
            StoreUpdate {
                name: "Larder".to_string(),
                version: v0,
            },
            store.id,
            &u1,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn update_outside_the_ownership_chain_is_not_found() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");

    let store = stores.insert(new_store("Pantry"), &u1).await.unwrap();

    let err = stores
        .update(
            StoreUpdate {
                name: "Larder".to_string(),
                version: store.version,
            },
            store.id,
            &UserId::new("u2"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound);
}

#[tokio::test]
async fn delete_by_non_owner_is_not_found_and_leaves_the_store() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");

    let store = stores.insert(new_store("Pantry"), &u1).await.unwrap();

    let err = stores.delete(store.id, &UserId::new("u2")).await.unwrap_err();
    assert_eq!(err, DomainError::NotFound);

    assert!(stores.get(store.id, &u1).await.is_ok());
}

#[tokio::test]
async fn deleting_a_store_cascades_to_its_items() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let item = items.insert(&scope, new_item("Rice", 5)).await.unwrap();

    stores.delete(scope.store_id(), &u1).await.unwrap();

    assert_eq!(
        items.get(&scope, item.id).await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn verify_requires_current_ownership() {
    let (stores, _) = repos();
    let u1 = UserId::new("u1");

    let store = stores.insert(new_store("Pantry"), &u1).await.unwrap();

    assert!(stores.verify(store.id, &u1).await.is_ok());
    assert_eq!(
        stores.verify(store.id, &UserId::new("u2")).await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn item_round_trip_preserves_fields() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let inserted = items.insert(&scope, new_item("Rice", 5)).await.unwrap();
    let fetched = items.get(&scope, inserted.id).await.unwrap();

    assert_eq!(fetched.name, "Rice");
    assert_eq!(fetched.current_capacity, 5);
    assert_eq!(fetched, inserted);
}

#[tokio::test]
async fn item_id_valid_under_another_store_is_not_found() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope_a = seeded_scope(&stores, &u1, "Pantry").await;
    let scope_b = seeded_scope(&stores, &u1, "Cellar").await;

    let item = items.insert(&scope_a, new_item("Rice", 5)).await.unwrap();

    assert_eq!(
        items.get(&scope_b, item.id).await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn low_capacity_filter_tracks_updates() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let rice = items.insert(&scope, new_item("Rice", 5)).await.unwrap();

    let warnings = items.list(&scope, true).await.unwrap();
    assert!(warnings.is_empty());

    items
        .update(
            &scope,
            ItemChange {
                id: rice.id,
                name: None,
                current_capacity: Some(1),
                version: rice.version,
            },
        )
        .await
        .unwrap();

    let warnings = items.list(&scope, true).await.unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].name, "Rice");

    // The unfiltered listing always has the full set.
    assert_eq!(items.list(&scope, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn partial_update_leaves_omitted_fields_unchanged() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let rice = items.insert(&scope, new_item("Rice", 5)).await.unwrap();

    let updated = items
        .update(
            &scope,
            ItemChange {
                id: rice.id,
                name: Some("Basmati".to_string()),
                current_capacity: None,
                version: rice.version,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Basmati");
    assert_eq!(updated.current_capacity, 5);
    assert_ne!(updated.version, rice.version);
    assert_eq!(updated.created_at, rice.created_at);
}

#[tokio::test]
async fn stale_item_version_conflicts() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let rice = items.insert(&scope, new_item("Rice", 5)).await.unwrap();
    let stale = rice.version;

    items
        .update(
            &scope,
            ItemChange {
                id: rice.id,
                name: None,
                current_capacity: Some(4),
                version: stale,
            },
        )
        .await
        .unwrap();

    let err = items
        .update(
            &scope,
            ItemChange {
                id: rice.id,
                name: None,
                current_capacity: Some(3),
                version: stale,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn id_by_name_finds_the_item_or_reports_not_found() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let rice = items.insert(&scope, new_item("Rice", 5)).await.unwrap();

    assert_eq!(items.id_by_name(&scope, "Rice").await.unwrap(), rice.id);
    assert_eq!(
        items.id_by_name(&scope, "Beans").await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn insert_batch_is_all_or_nothing() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let err = items
        .insert_batch(
            &scope,
            vec![new_item("Rice", 5), new_item("Beans", 0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Constraint(_)));

    assert!(items.list(&scope, false).await.unwrap().is_empty());

    let inserted = items
        .insert_batch(
            &scope,
            vec![new_item("Rice", 5), new_item("Beans", 2)],
        )
        .await
        .unwrap();
    assert_eq!(inserted.len(), 2);
    assert_eq!(items.list(&scope, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_batch_is_all_or_nothing() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    let rice = items.insert(&scope, new_item("Rice", 5)).await.unwrap();
    let beans = items.insert(&scope, new_item("Beans", 2)).await.unwrap();

    let err = items
        .update_batch(
            &scope,
            vec![
                ItemChange {
                    id: rice.id,
                    name: None,
                    current_capacity: Some(4),
                    version: rice.version,
                },
                ItemChange {
                    id: beans.id,
                    name: None,
                    current_capacity: Some(1),
                    version: Version::generate(), // stale
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // The first element was not applied either.
    assert_eq!(
        items.get(&scope, rice.id).await.unwrap().current_capacity,
        5
    );
}

#[tokio::test]
async fn delete_item_is_scoped_by_store() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope_a = seeded_scope(&stores, &u1, "Pantry").await;
    let scope_b = seeded_scope(&stores, &u1, "Cellar").await;

    let rice = items.insert(&scope_a, new_item("Rice", 5)).await.unwrap();

    assert_eq!(
        items.delete(&scope_b, rice.id).await.unwrap_err(),
        DomainError::NotFound
    );
    items.delete(&scope_a, rice.id).await.unwrap();
    assert_eq!(
        items.delete(&scope_a, rice.id).await.unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test]
async fn unknown_item_delete_is_not_found() {
    let (stores, items) = repos();
    let u1 = UserId::new("u1");
    let scope = seeded_scope(&stores, &u1, "Pantry").await;

    assert_eq!(
        items.delete(&scope, ItemId::from_row(99)).await.unwrap_err(),
        DomainError::NotFound
    );
}
