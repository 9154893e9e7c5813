use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::AppConfig;

pub async fn healthcheck(Extension(config): Extension<AppConfig>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "health_status": {
                "status": "available",
                "environment": config.environment,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })),
    )
}
