use std::sync::Arc;

use sqlx::PgPool;

use stockroom_infra::repository::{
    InMemoryRepositories, ItemRepository, PgItemRepository, PgStoreRepository, StoreRepository,
};

/// Repository handles shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub stores: Arc<dyn StoreRepository>,
    pub items: Arc<dyn ItemRepository>,
}

impl AppServices {
    /// Production wiring over a connection pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool)),
        }
    }

    /// Dev/test wiring; state lives for the lifetime of the router.
    pub fn in_memory() -> Self {
        let backing = InMemoryRepositories::new();
        Self {
            stores: Arc::new(backing.stores()),
            items: Arc::new(backing.items()),
        }
    }
}
