//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository wiring (Postgres or in-memory)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON envelope helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Deployment descriptor reported by the healthcheck.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
}

impl AppConfig {
    /// Read the environment label from `ENV`.
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var("ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String, config: AppConfig, services: services::AppServices) -> Router {
    let jwt = Arc::new(stockroom_auth::Hs256JwtValidator::new(
        jwt_secret.into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a verified identity.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/v1/healthcheck", get(routes::system::healthcheck))
        .nest("/v1", protected)
        .layer(Extension(config))
        .layer(ServiceBuilder::new())
}
