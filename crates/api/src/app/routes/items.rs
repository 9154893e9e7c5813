use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use stockroom_auth::Identity;
use stockroom_core::{ItemId, StoreId};
use stockroom_infra::repository::StoreScope;
use stockroom_items::{CapacityReport, NewItem};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/batch", post(create_items_batch).put(update_items_batch))
        .route("/id", get(get_item_id))
        .route("/options", get(capacity_options))
        .route(
            "/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

/// Resolve the path value and prove the caller owns the store. Every
/// handler below goes through here before touching items.
async fn verified_scope(
    services: &AppServices,
    identity: &Identity,
    raw_store_id: &str,
) -> Result<StoreScope, axum::response::Response> {
    let store_id = StoreId::resolve(raw_store_id).map_err(errors::domain_error_to_response)?;

    services
        .stores
        .verify(store_id, identity.user_id())
        .await
        .map_err(errors::domain_error_to_response)
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.list(&scope, query.only_warnings).await {
        Ok(items) => dto::envelope(StatusCode::OK, "items", items),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
    Json(body): Json<NewItem>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.insert(&scope, body).await {
        Ok(item) => dto::envelope(StatusCode::CREATED, "new_item", item),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_items_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
    Json(body): Json<dto::NewItemsBatch>,
) -> axum::response::Response {
    for new_item in &body.items {
        if let Err(e) = new_item.validate() {
            return errors::domain_error_to_response(e);
        }
    }

    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.insert_batch(&scope, body.items).await {
        Ok(items) => dto::envelope(StatusCode::CREATED, "new_items", items),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path((store_id, item_id)): Path<(String, String)>,
) -> axum::response::Response {
    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    let item_id = match ItemId::resolve(&item_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.get(&scope, item_id).await {
        Ok(item) => dto::envelope(StatusCode::OK, "item", item),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_item_id(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
    Query(query): Query<dto::ItemIdQuery>,
) -> axum::response::Response {
    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.id_by_name(&scope, &query.name).await {
        Ok(id) => dto::envelope(StatusCode::OK, "item_id", id),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn capacity_options(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
) -> axum::response::Response {
    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.list(&scope, false).await {
        Ok(items) => dto::envelope(StatusCode::OK, "options", CapacityReport::from_items(&items)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path((store_id, item_id)): Path<(String, String)>,
    Json(mut body): Json<stockroom_items::ItemChange>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    // The path is authoritative for the target id.
    body.id = match ItemId::resolve(&item_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.update(&scope, body).await {
        Ok(item) => dto::envelope(StatusCode::OK, "updated_item", item),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_items_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<String>,
    Json(body): Json<dto::ItemChangesBatch>,
) -> axum::response::Response {
    for change in &body.items {
        if let Err(e) = change.validate() {
            return errors::domain_error_to_response(e);
        }
    }

    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.items.update_batch(&scope, body.items).await {
        Ok(items) => dto::envelope(StatusCode::OK, "updated_items", items),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path((store_id, item_id)): Path<(String, String)>,
) -> axum::response::Response {
    let scope = match verified_scope(&services, &identity, &store_id).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    let item_id = match ItemId::resolve(&item_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.delete(&scope, item_id).await {
        Ok(()) => dto::envelope(StatusCode::OK, "deleted_item_id", item_id),
        Err(e) => errors::domain_error_to_response(e),
    }
}
