use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_items::{ItemChange, NewItem};

/// Batch create payload: `{"items": [...]}`.
#[derive(Debug, Deserialize)]
pub struct NewItemsBatch {
    pub items: Vec<NewItem>,
}

/// Batch update payload: `{"items": [...]}`.
#[derive(Debug, Deserialize)]
pub struct ItemChangesBatch {
    pub items: Vec<ItemChange>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub only_warnings: bool,
}

#[derive(Debug, Deserialize)]
pub struct ItemIdQuery {
    pub name: String,
}

/// Wrap a payload in a single-key JSON envelope, e.g. `{"stores": [...]}`.
pub fn envelope(status: StatusCode, key: &'static str, value: impl Serialize) -> axum::response::Response {
    let mut map = serde_json::Map::new();
    map.insert(
        key.to_string(),
        serde_json::to_value(value).unwrap_or(Value::Null),
    );
    (status, axum::Json(Value::Object(map))).into_response()
}
