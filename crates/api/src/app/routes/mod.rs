use axum::Router;

pub mod items;
pub mod stores;
pub mod system;

/// Router for all authenticated endpoints (nested under `/v1`).
pub fn router() -> Router {
    Router::new()
        .nest("/stores", stores::router())
        .nest("/stores/:store_id/items", items::router())
}
