use stockroom_api::app::{self, services::AppServices, AppConfig};
use stockroom_infra::DbSettings;

#[tokio::main]
async fn main() {
    stockroom_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let settings = match DbSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("bad database configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match stockroom_infra::connect(&settings).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("database unreachable: {e}");
            std::process::exit(1);
        }
    };

    let app = app::build_app(jwt_secret, AppConfig::from_env(), AppServices::postgres(pool));

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
