//! Infrastructure layer: database settings, connection pool, repositories.

pub mod config;
pub mod repository;

#[cfg(test)]
mod integration_tests;

pub use config::{connect, DbSettings};
pub use repository::{
    InMemoryItemRepository, InMemoryRepositories, InMemoryStoreRepository, ItemRepository,
    PgItemRepository, PgStoreRepository, StoreRepository, StoreScope,
};
