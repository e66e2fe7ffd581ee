// --- File: crates/services/pixbridge_backend/src/app.rs ---
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use pixbridge_db::{DbClient, DbError, SqlTransactionStore};
use pixbridge_inter::{InterClient, InterError};
use pixbridge_reconciler::DeliveryError;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Everything that can stop the service from coming up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("Inter client error: {0}")]
    Inter(#[from] InterError),

    #[error("webhook client error: {0}")]
    Webhook(#[from] DeliveryError),

    #[error("missing configuration section: {0}")]
    MissingSection(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared by the HTTP routes; the reconciler holds its own clones.
#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub client: Arc<InterClient>,
    pub store: Arc<SqlTransactionStore>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.db.is_healthy().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: false,
            }),
        )
    }
}

/// Builds the full application router, everything under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the pixbridge API!" }))
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .merge(pixbridge_inter::routes(state.client, state.store));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use pixbridge_inter::doc::InterApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "pixbridge API",
                version = "0.1.0",
                description = "Pix charges over Banco Inter",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(InterApiDoc::openapi());
        tracing::info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(TraceLayer::new_for_http())
}
