use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_auth::Identity;
use stockroom_core::StoreId;
use stockroom_stores::{NewStore, StoreUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/:id", get(get_store).put(update_store).delete(delete_store))
}

pub async fn create_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<NewStore>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.stores.insert(body, identity.user_id()).await {
        Ok(store) => dto::envelope(StatusCode::CREATED, "store", store),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.stores.list(identity.user_id()).await {
        Ok(stores) => dto::envelope(StatusCode::OK, "stores", stores),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let store_id = match StoreId::resolve(&id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.stores.get(store_id, identity.user_id()).await {
        Ok(store) => dto::envelope(StatusCode::OK, "store", store),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<StoreUpdate>,
) -> axum::response::Response {
    let store_id = match StoreId::resolve(&id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    match services
        .stores
        .update(body, store_id, identity.user_id())
        .await
    {
        Ok(store) => dto::envelope(StatusCode::OK, "store", store),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let store_id = match StoreId::resolve(&id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.stores.delete(store_id, identity.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
